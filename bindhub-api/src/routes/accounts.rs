/// Account lifecycle endpoints
///
/// Orchestrates create/read/update/delete/password-change for accounts:
/// every operation first consults the authorization policy, then applies the
/// password policy where credentials are involved, and finally touches
/// storage. Mutations stamp `created_by`/`modified_by` with the requester's
/// network address.
use axum::{
    extract::{ConnectInfo, Path, State},
    Extension,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use validator::Validate;

use bindhub_shared::{
    auth::{
        password,
        policy::{authorize_account, AccountAction, AuthContext},
    },
    models::account::{Account, BindType, CreateAccount, Role, UpdateAccount},
};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::Json,
    response,
    response::Envelope,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 255, message = "Password must be 8-255 characters"))]
    pub password: String,

    #[validate(length(max = 30, message = "Manager name must be at most 30 characters"))]
    pub manager_name: Option<String>,

    #[validate(length(max = 15, message = "Tel must be at most 15 characters"))]
    pub tel: Option<String>,

    #[validate(length(max = 10, message = "Ext must be at most 10 characters"))]
    pub ext: Option<String>,

    #[validate(length(max = 300, message = "Channel token must be at most 300 characters"))]
    pub channel_token: Option<String>,

    #[validate(length(max = 100, message = "Channel secret must be at most 100 characters"))]
    pub channel_secret: Option<String>,

    pub bind_type: Option<BindType>,

    #[validate(length(max = 50, message = "Bind word must be at most 50 characters"))]
    pub bind_word: Option<String>,

    /// Account status, enabled by default
    pub status: Option<bool>,
}

/// Partial update. `password` here is the caller's current password used as
/// the verification credential for non-admins; it is never written. Neither
/// `role` nor a new password can be set through this request.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAccountRequest {
    pub password: Option<String>,

    #[validate(length(max = 30, message = "Manager name must be at most 30 characters"))]
    pub manager_name: Option<String>,

    #[validate(length(max = 15, message = "Tel must be at most 15 characters"))]
    pub tel: Option<String>,

    #[validate(length(max = 10, message = "Ext must be at most 10 characters"))]
    pub ext: Option<String>,

    #[validate(length(max = 300, message = "Channel token must be at most 300 characters"))]
    pub channel_token: Option<String>,

    #[validate(length(max = 100, message = "Channel secret must be at most 100 characters"))]
    pub channel_secret: Option<String>,

    pub bind_type: Option<BindType>,

    #[validate(length(max = 50, message = "Bind word must be at most 50 characters"))]
    pub bind_word: Option<String>,

    pub status: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Required for non-admin callers, ignored for admins
    pub old_password: Option<String>,

    #[validate(length(min = 8, max = 255, message = "Password must be 8-255 characters"))]
    pub new_password: String,
}

/// Create account (admin only)
///
/// ```text
/// POST /api/accounts
/// ```
///
/// Email uniqueness is pre-checked with an exact match; the database unique
/// constraint remains the authoritative guard against a concurrent
/// duplicate, which also surfaces as "Account already exists".
pub async fn create_account(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<CreateAccountRequest>,
) -> ApiResult<Json<Envelope>> {
    req.validate()?;
    authorize_account(Some(&ctx), AccountAction::Create)?;

    if Account::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::BadRequest("Account already exists".to_string()));
    }

    validate_new_password(&req.password)?;
    let password_hash = password::hash_password(&req.password)?;

    let account = Account::create(
        &state.db,
        CreateAccount {
            email: req.email,
            password_hash,
            manager_name: req.manager_name,
            tel: req.tel,
            ext: req.ext,
            channel_token: req.channel_token,
            channel_secret: req.channel_secret,
            bind_type: req.bind_type,
            bind_word: req.bind_word,
            status: req.status.unwrap_or(true),
            created_by: Some(addr.ip().to_string()),
        },
    )
    .await?;

    Ok(response::success(account, "Account created"))
}

/// List all accounts (admin only)
pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<Envelope>> {
    authorize_account(Some(&ctx), AccountAction::List)?;

    let accounts = Account::list(&state.db).await?;
    Ok(response::success(accounts, "Success"))
}

/// The caller's own account
pub async fn me(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<Envelope>> {
    let account = Account::find_by_id(&state.db, ctx.account_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    Ok(response::success(account, "Success"))
}

/// Read one account
///
/// The policy check runs before the fetch: a caller without the permission
/// class gets `Forbidden` whether or not the id exists, while an entitled
/// caller gets `NotFound` for an absent id.
pub async fn get_account(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Envelope>> {
    authorize_account(Some(&ctx), AccountAction::Read { target: id })?;

    let account = Account::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    Ok(response::success(account, "Success"))
}

/// Partially update one account
///
/// Non-admin callers must prove knowledge of the current password; admins
/// bypass that check.
pub async fn update_account(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateAccountRequest>,
) -> ApiResult<Json<Envelope>> {
    req.validate()?;
    authorize_account(Some(&ctx), AccountAction::Update { target: id })?;

    let existing = Account::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    if ctx.role != Role::Admin {
        let supplied = req.password.as_deref().unwrap_or_default();
        if !password::verify_password(supplied, &existing.password_hash) {
            return Err(ApiError::Forbidden("Incorrect password".to_string()));
        }
    }

    let patch = UpdateAccount {
        manager_name: req.manager_name,
        tel: req.tel,
        ext: req.ext,
        channel_token: req.channel_token,
        channel_secret: req.channel_secret,
        bind_type: req.bind_type,
        bind_word: req.bind_word,
        status: req.status,
    };

    let account = Account::update(&state.db, id, patch, &addr.ip().to_string())
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    Ok(response::success(account, "Account updated"))
}

/// Change one account's password
///
/// ```text
/// PUT /api/accounts/:id/password
/// ```
///
/// Non-admin callers must supply the correct old password; admins skip that
/// check. The new password goes through the strength policy before hashing.
pub async fn change_password(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<Envelope>> {
    req.validate()?;
    authorize_account(Some(&ctx), AccountAction::ChangePassword { target: id })?;

    let account = Account::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    if ctx.role != Role::Admin {
        let old = req.old_password.as_deref().unwrap_or_default();
        if !password::verify_password(old, &account.password_hash) {
            return Err(ApiError::BadRequest("Old password is incorrect".to_string()));
        }
    }

    validate_new_password(&req.new_password)?;
    let password_hash = password::hash_password(&req.new_password)?;

    let updated =
        Account::set_password(&state.db, id, &password_hash, &addr.ip().to_string()).await?;
    if !updated {
        return Err(ApiError::NotFound("Account not found".to_string()));
    }

    Ok(response::success(
        json!(null),
        "Password updated successfully",
    ))
}

/// Delete one account (admin only, never the caller's own)
///
/// Owned users are removed by the storage layer's cascade rule.
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Envelope>> {
    authorize_account(Some(&ctx), AccountAction::Delete { target: id })?;

    let deleted = Account::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Account not found".to_string()));
    }

    Ok(response::success(
        json!(null),
        &format!("Account with ID {} deleted successfully", id),
    ))
}

fn validate_new_password(candidate: &str) -> Result<(), ApiError> {
    password::validate_password(candidate).map_err(ApiError::BadRequest)
}
