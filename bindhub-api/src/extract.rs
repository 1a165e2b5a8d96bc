/// Request-body extraction
///
/// Wraps `axum::Json` so that a body that fails to parse or deserialize is
/// reported through the unified envelope instead of axum's plain-text
/// rejection. Handlers use this `Json` for both request bodies and
/// responses.
use axum::extract::FromRequest;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}
