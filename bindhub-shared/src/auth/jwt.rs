/// Bearer token issuing and verification
///
/// Tokens are HS256-signed JWTs carrying the account identity and role.
/// They are stateless: nothing is stored server-side, and every protected
/// request re-verifies the signature and expiry.
///
/// Verification fails closed. A missing mandatory claim (`account_id`), an
/// unexpected algorithm, a bad signature, or a malformed payload all come
/// back as the generic [`TokenError::Invalid`] so callers cannot probe which
/// check failed. Only expiry is surfaced distinctly.
///
/// # Example
///
/// ```
/// use bindhub_shared::auth::jwt::{issue_token, verify_token, Claims};
/// use bindhub_shared::models::account::Role;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let claims = Claims::new(7, "a@x.com".to_string(), Role::Member);
///
/// let token = issue_token(&claims, secret)?;
/// let verified = verify_token(&token, secret)?;
/// assert_eq!(verified.account_id, 7);
/// # Ok(())
/// # }
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::account::Role;

/// Fixed token lifetime.
pub const TOKEN_TTL_MINUTES: i64 = 60;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to sign a new token (server-side fault)
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token expired")]
    Expired,

    /// Anything else: bad signature, malformed structure, missing claims.
    /// Deliberately undifferentiated.
    #[error("Invalid token")]
    Invalid,
}

/// Token claims
///
/// A closed record: every field is mandatory at deserialization, so a token
/// missing `account_id` (or any other field) is rejected during [`verify_token`]
/// rather than defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account's email
    pub sub: String,

    /// Account identifier
    pub account_id: i64,

    /// Account role
    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims expiring [`TOKEN_TTL_MINUTES`] from now
    pub fn new(account_id: i64, email: String, role: Role) -> Self {
        let now = Utc::now();
        let expiry = now + Duration::minutes(TOKEN_TTL_MINUTES);

        Self {
            sub: email,
            account_id,
            role,
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        }
    }

    /// Checks whether the embedded expiry has passed
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims into a bearer token using HS256
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key).map_err(|e| TokenError::CreateError(e.to_string()))
}

/// Verifies a bearer token and extracts its claims
///
/// Checks the HS256 signature and the `exp` claim. Any structural problem
/// maps to [`TokenError::Invalid`]; an expired but otherwise valid token maps
/// to [`TokenError::Expired`].
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    let data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })?;

    Ok(data.claims)
}
