/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// Reports the service version and whether the database answers a trivial
/// query.
use axum::extract::State;
use serde::Serialize;

use crate::{app::AppState, error::ApiResult, extract::Json, response, response::Envelope};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub database: String,
}

pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<Envelope>> {
    let database = match bindhub_shared::db::pool::health_check(&state.db).await {
        Ok(()) => "connected",
        Err(_) => "disconnected",
    };

    let status = if database == "connected" {
        "healthy"
    } else {
        "degraded"
    };

    Ok(response::success(
        HealthStatus {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: database.to_string(),
        },
        "Success",
    ))
}
