/// Unified response envelope
///
/// Every handled path, success or failure, returns the same shape:
///
/// ```json
/// {
///   "ok": true,
///   "data": { ... },
///   "message": "Success",
///   "timestamp": "2024-01-15T00:00:00Z",
///   "errors": [ ... ]
/// }
/// ```
///
/// `errors` is only present on validation failures.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::extract::Json;

/// The envelope body
#[derive(Debug, Serialize)]
pub struct Envelope {
    /// Whether the request succeeded
    pub ok: bool,

    /// Payload, `null` when there is none
    pub data: Value,

    /// Human-readable outcome
    pub message: String,

    /// ISO-8601 UTC timestamp of the response
    pub timestamp: String,

    /// Field-level error details (validation failures only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
}

/// Builds a 200 success envelope around `data`
pub fn success<T: Serialize>(data: T, message: &str) -> Json<Envelope> {
    Json(Envelope {
        ok: true,
        data: serde_json::to_value(data).unwrap_or(Value::Null),
        message: message.to_string(),
        timestamp: Utc::now().to_rfc3339(),
        errors: None,
    })
}

/// Builds a failure envelope with the given status
pub fn fail(status: StatusCode, message: &str, errors: Option<Value>) -> Response {
    let body = Json(Envelope {
        ok: false,
        data: Value::Null,
        message: message.to_string(),
        timestamp: Utc::now().to_rfc3339(),
        errors,
    });

    (status, body).into_response()
}
