/// Login endpoint
///
/// ```text
/// POST /api/token
/// Content-Type: application/json
///
/// { "email": "a@x.com", "password": "Passw0rd" }
/// ```
///
/// On success the envelope carries `{ "access_token": "...", "token_type":
/// "bearer" }`; the token embeds the account id, email, and role and expires
/// after 60 minutes.
use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use bindhub_shared::{
    auth::{jwt, password},
    models::account::Account,
};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::Json,
    response,
    response::Envelope,
};

/// The one login failure message. Absent email, wrong password, and
/// inactive account are deliberately indistinguishable so the endpoint
/// cannot be used to enumerate accounts.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<Envelope>> {
    req.validate()?;

    let account = Account::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthenticated(INVALID_CREDENTIALS.to_string()))?;

    if !password::verify_password(&req.password, &account.password_hash) {
        return Err(ApiError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
    }

    if !account.status {
        return Err(ApiError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
    }

    let email = account.email.clone().unwrap_or_default();
    let claims = jwt::Claims::new(account.id, email, account.role);
    let access_token = jwt::issue_token(&claims, state.jwt_secret())?;

    Ok(response::success(
        json!(TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
        }),
        "Login successful",
    ))
}
