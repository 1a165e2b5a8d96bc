/// Password policy and hashing using Argon2id
///
/// Passwords are hashed with Argon2id and stored as PHC strings
/// (`$argon2id$v=19$...`), which embed the algorithm parameters and the
/// per-call random salt. Hashing the same password twice therefore yields
/// two different strings, both of which verify.
///
/// # Example
///
/// ```
/// use bindhub_shared::auth::password::{hash_password, validate_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let password = "Passw0rd";
/// validate_password(password)?;
///
/// let hash = hash_password(password)?;
/// assert!(verify_password(password, &hash));
/// assert!(!verify_password("wrong", &hash));
/// # Ok(())
/// # }
/// ```
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Symbols permitted in passwords besides ASCII letters and digits.
const ALLOWED_SYMBOLS: &[char] = &['@', '$', '!', '%', '*', '?', '&'];

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),
}

/// Validates password strength
///
/// Requirements:
/// - at least 8 characters
/// - at least one ASCII uppercase letter, one lowercase letter, one digit
/// - only ASCII letters, digits, and the symbols `@ $ ! % * ? &`
///
/// Pure check; performs no hashing.
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain at least one lowercase letter".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one number".to_string());
    }

    if !password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || ALLOWED_SYMBOLS.contains(&c))
    {
        return Err("Password may only contain letters, numbers, and @$!%*?&".to_string());
    }

    Ok(())
}

/// Hashes a password with Argon2id and a fresh random salt
///
/// The cost parameters are the argon2 crate defaults (fixed at build time);
/// they are embedded in the returned PHC string, so verification never needs
/// them supplied separately.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verifies a plaintext password against a stored PHC hash
///
/// Comparison is constant-time inside argon2. A malformed or truncated hash
/// never verifies: it yields `false`, not an error, so a corrupt stored hash
/// degrades to a failed login rather than a fault.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
