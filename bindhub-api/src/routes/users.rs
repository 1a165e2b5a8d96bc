/// User lifecycle endpoints (tenant-scoped)
///
/// Users belong to exactly one account. Every operation here is scoped to
/// the caller's own account: the storage queries filter on the caller's
/// account id, so a user owned by another account is indistinguishable from
/// one that does not exist. There is no admin override on this surface.
use axum::{
    extract::{ConnectInfo, Path, State},
    Extension,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use validator::Validate;

use bindhub_shared::{
    auth::policy::{authorize_user, AuthContext},
    models::{
        account::BindType,
        user::{CreateUser, UpdateUser, User, UserStatus},
    },
};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::Json,
    response,
    response::Envelope,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Owning account; must match the caller's own account
    pub account_id: i64,

    #[validate(length(min = 1, max = 50, message = "Line user ID must be 1-50 characters"))]
    pub line_user_id: String,

    #[validate(length(max = 30, message = "User code must be at most 30 characters"))]
    pub user_code: Option<String>,

    #[validate(length(max = 30, message = "User name must be at most 30 characters"))]
    pub user_name: Option<String>,

    pub bind_type: Option<BindType>,

    #[validate(length(max = 50, message = "Bind word must be at most 50 characters"))]
    pub bind_word: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(max = 30, message = "User code must be at most 30 characters"))]
    pub user_code: Option<String>,

    #[validate(length(max = 30, message = "User name must be at most 30 characters"))]
    pub user_name: Option<String>,

    pub bind_type: Option<BindType>,

    #[validate(length(max = 50, message = "Bind word must be at most 50 characters"))]
    pub bind_word: Option<String>,

    pub status: Option<UserStatus>,

    pub bind_date: Option<DateTime<Utc>>,
}

/// Create a user under the caller's account
///
/// ```text
/// POST /api/users
/// ```
///
/// Duplicate `(account_id, line_user_id)` pairs are pre-checked; the unique
/// constraint remains the authoritative guard against a concurrent insert.
pub async fn create_user(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<Json<Envelope>> {
    req.validate()?;
    authorize_user(Some(&ctx), req.account_id)?;

    if User::find_by_binding(&state.db, req.account_id, &req.line_user_id)
        .await?
        .is_some()
    {
        return Err(ApiError::BadRequest(
            "User already bound for this account".to_string(),
        ));
    }

    let user = User::create(
        &state.db,
        CreateUser {
            account_id: req.account_id,
            line_user_id: req.line_user_id,
            user_code: req.user_code,
            user_name: req.user_name,
            bind_type: req.bind_type,
            bind_word: req.bind_word,
            created_by: Some(addr.ip().to_string()),
        },
    )
    .await?;

    Ok(response::success(user, "User created"))
}

/// List the caller's own users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<Envelope>> {
    let users = User::list_by_account(&state.db, ctx.account_id).await?;
    Ok(response::success(users, "Success"))
}

/// Read one of the caller's users
pub async fn get_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Envelope>> {
    let user = User::find_owned(&state.db, id, ctx.account_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(response::success(user, "Success"))
}

/// Partially update one of the caller's users
pub async fn update_user(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<Envelope>> {
    req.validate()?;

    let patch = UpdateUser {
        user_code: req.user_code,
        user_name: req.user_name,
        bind_type: req.bind_type,
        bind_word: req.bind_word,
        status: req.status,
        bind_date: req.bind_date,
    };

    let user = User::update_owned(&state.db, id, ctx.account_id, patch, &addr.ip().to_string())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(response::success(user, "User updated"))
}

/// Delete one of the caller's users
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Envelope>> {
    let deleted = User::delete_owned(&state.db, id, ctx.account_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(response::success(
        json!(null),
        &format!("User with ID {} deleted successfully", id),
    ))
}
