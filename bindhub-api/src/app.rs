/// Application state and router builder
///
/// # Route map
///
/// ```text
/// /
/// ├── /health                          # liveness + DB probe (public)
/// └── /api/
///     ├── POST /token                  # login (public)
///     ├── /accounts/                   # account lifecycle (bearer token)
///     │   ├── POST   /                 # create (admin)
///     │   ├── GET    /                 # list (admin)
///     │   ├── GET    /me               # caller's own record
///     │   ├── GET    /:id
///     │   ├── PUT    /:id
///     │   ├── DELETE /:id              # admin, self-delete guarded
///     │   └── PUT    /:id/password
///     └── /users/                      # user lifecycle (bearer token,
///         ├── POST   /                 #  strictly tenant-scoped)
///         ├── GET    /
///         ├── GET    /:id
///         ├── PUT    /:id
///         └── DELETE /:id
/// ```
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use bindhub_shared::auth::{jwt, policy::AuthContext};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;
use crate::error::ApiError;

/// Shared application state, cloned per request
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Token signing secret (read-only, process lifetime)
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let account_routes = Router::new()
        .route(
            "/accounts",
            post(routes::accounts::create_account).get(routes::accounts::list_accounts),
        )
        .route("/accounts/me", get(routes::accounts::me))
        .route(
            "/accounts/:id",
            get(routes::accounts::get_account)
                .put(routes::accounts::update_account)
                .delete(routes::accounts::delete_account),
        )
        .route(
            "/accounts/:id/password",
            put(routes::accounts::change_password),
        );

    let user_routes = Router::new()
        .route(
            "/users",
            post(routes::users::create_user).get(routes::users::list_users),
        )
        .route(
            "/users/:id",
            get(routes::users::get_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        );

    // Every account/user operation requires a verified bearer token; login
    // and the health probe do not.
    let protected = Router::new()
        .merge(account_routes)
        .merge(user_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api = Router::new()
        .route("/token", post(routes::auth::login))
        .merge(protected);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bearer-token authentication middleware
///
/// Verifies the token and injects an [`AuthContext`] into request
/// extensions. Absent or malformed presentation fails here, before any
/// policy rule runs.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthenticated("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthenticated("Expected Bearer token".to_string()))?;

    let claims = jwt::verify_token(token, state.jwt_secret())?;

    let ctx = AuthContext::from_claims(&claims);
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}
