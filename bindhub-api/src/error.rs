/// Error handling for the API server
///
/// All handlers return `Result<T, ApiError>`. Every business-rule failure is
/// translated here into the unified response envelope with the appropriate
/// status code; only truly unexpected faults become a 500 with a generic
/// body (details go to the log, never to the client).
///
/// # Example
///
/// ```ignore
/// async fn handler() -> ApiResult<Json<Envelope>> {
///     let account = Account::find_by_id(&pool, id)
///         .await?
///         .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;
///     Ok(success(account, "Success"))
/// }
/// ```
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;

use bindhub_shared::auth::{jwt::TokenError, password::PasswordError, policy::PolicyError};

use crate::response::fail;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400): weak password, duplicate record, bad old password
    BadRequest(String),

    /// Unauthenticated (401): missing/invalid/expired token, bad credentials
    Unauthenticated(String),

    /// Forbidden (403): valid identity, insufficient privilege
    Forbidden(String),

    /// Not found (404): absent resource, or merged not-found-or-forbidden
    NotFound(String),

    /// Unprocessable entity (422): request-shape validation failures
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    Internal(String),
}

/// One field-level validation failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => fail(StatusCode::BAD_REQUEST, &msg, None),
            ApiError::Unauthenticated(msg) => fail(StatusCode::UNAUTHORIZED, &msg, None),
            ApiError::Forbidden(msg) => fail(StatusCode::FORBIDDEN, &msg, None),
            ApiError::NotFound(msg) => fail(StatusCode::NOT_FOUND, &msg, None),
            ApiError::ValidationError(errors) => {
                let details = serde_json::to_value(errors).unwrap_or_default();
                fail(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Validation Error",
                    Some(details),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                fail(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred",
                    None,
                )
            }
        }
    }
}

/// Storage errors: unique-constraint races become duplicate failures, never
/// generic faults.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("line_user_id") {
                        return ApiError::BadRequest(
                            "User already bound for this account".to_string(),
                        );
                    }
                    if constraint.contains("email") {
                        return ApiError::BadRequest("Account already exists".to_string());
                    }
                    return ApiError::BadRequest("Duplicate record".to_string());
                }

                ApiError::Internal(format!("Database error: {}", db_err))
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<PolicyError> for ApiError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::Unauthenticated => ApiError::Unauthenticated(err.to_string()),
            PolicyError::Forbidden | PolicyError::SelfDeleteForbidden => {
                ApiError::Forbidden(err.to_string())
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => ApiError::Unauthenticated("Token expired".to_string()),
            TokenError::Invalid => ApiError::Unauthenticated("Invalid token".to_string()),
            TokenError::CreateError(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Body extraction failures go through the envelope like every other
/// failure: a shape mismatch is a 422 with detail, a syntax error or a
/// missing/wrong content type is a 400.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                ApiError::ValidationError(vec![ValidationErrorDetail {
                    field: "body".to_string(),
                    message: err.body_text(),
                }])
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let details: Vec<ValidationErrorDetail> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        ApiError::ValidationError(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Account already exists".to_string());
        assert_eq!(err.to_string(), "Bad request: Account already exists");

        let err = ApiError::NotFound("User not found".to_string());
        assert_eq!(err.to_string(), "Not found: User not found");
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                ApiError::BadRequest("x".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Unauthenticated("x".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
            (ApiError::Forbidden("x".to_string()), StatusCode::FORBIDDEN),
            (ApiError::NotFound("x".to_string()), StatusCode::NOT_FOUND),
            (
                ApiError::ValidationError(vec![]),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::Internal("x".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_policy_errors_map_to_statuses() {
        let err: ApiError = PolicyError::Unauthenticated.into();
        assert!(matches!(err, ApiError::Unauthenticated(_)));

        let err: ApiError = PolicyError::Forbidden.into();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let err: ApiError = PolicyError::SelfDeleteForbidden.into();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[derive(Debug)]
    struct FakeDbError {
        constraint: &'static str,
    }

    impl fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(
                f,
                "duplicate key value violates unique constraint \"{}\"",
                self.constraint
            )
        }
    }

    impl std::error::Error for FakeDbError {}

    impl sqlx::error::DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn constraint(&self) -> Option<&str> {
            Some(self.constraint)
        }
    }

    fn unique_violation(constraint: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakeDbError { constraint }))
    }

    #[test]
    fn test_unique_violations_map_to_duplicate_messages() {
        // The users constraint name contains both "account_id" and
        // "line_user_id"; it must win over the email branch.
        let err: ApiError = unique_violation("users_account_id_line_user_id_key").into();
        match err {
            ApiError::BadRequest(msg) => assert_eq!(msg, "User already bound for this account"),
            other => panic!("unexpected: {:?}", other),
        }

        let err: ApiError = unique_violation("accounts_email_key").into();
        match err {
            ApiError::BadRequest(msg) => assert_eq!(msg, "Account already exists"),
            other => panic!("unexpected: {:?}", other),
        }

        let err: ApiError = unique_violation("some_other_key").into();
        match err {
            ApiError::BadRequest(msg) => assert_eq!(msg, "Duplicate record"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "Resource not found"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_token_errors_are_unauthenticated() {
        let err: ApiError = TokenError::Expired.into();
        match err {
            ApiError::Unauthenticated(msg) => assert_eq!(msg, "Token expired"),
            other => panic!("unexpected: {:?}", other),
        }

        let err: ApiError = TokenError::Invalid.into();
        match err {
            ApiError::Unauthenticated(msg) => assert_eq!(msg, "Invalid token"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
