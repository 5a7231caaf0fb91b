//! API error types and helpers.
//!
//! # Purpose and responsibility
//! Centralizes HTTP error response construction so groups, ACLs and providers
//! report failures in one shape.
//!
//! # Key invariants and assumptions
//! - Error responses carry a stable `code` and a human-readable `message`.
//! - Validation failures also carry every collected message keyed by path.
//! - Status codes align with the error category.
//!
//! # Security considerations
//! - Store and collaborator failures are logged server-side; clients only see
//!   a generic message.
use crate::api::types::{ErrorResponse, FieldErrors};
use crate::store::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use catalog_acl::{DependencyError, ValidationErrors};

/// Structured API error returned by handlers.
///
/// # Invariants
/// - `status` must match the semantics of `body.code`.
///
/// # Example
/// ```rust
/// use access_control::api::error::ApiError;
/// use access_control::api::types::ErrorResponse;
/// use axum::http::StatusCode;
///
/// let err = ApiError {
///     status: StatusCode::NOT_FOUND,
///     body: ErrorResponse {
///         code: "not_found".to_string(),
///         message: "missing".to_string(),
///         request_id: None,
///         errors: Vec::new(),
///     },
/// };
/// ```
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn error(status: StatusCode, code: &str, message: &str) -> ApiError {
    ApiError {
        status,
        body: ErrorResponse {
            code: code.to_string(),
            message: message.to_string(),
            request_id: None,
            errors: Vec::new(),
        },
    }
}

/// Build a 404 Not Found error.
///
/// # Errors
/// - Does not fail.
pub fn api_not_found(message: &str) -> ApiError {
    error(StatusCode::NOT_FOUND, "not_found", message)
}

/// Build a 409 Conflict error.
///
/// # What it does
/// Returns an `ApiError` with a caller-provided conflict code.
///
/// # Errors
/// - Does not fail.
pub fn api_conflict(code: &str, message: &str) -> ApiError {
    error(StatusCode::CONFLICT, code, message)
}

/// Build a 500 Internal Server Error from a store error.
///
/// # What it does
/// Logs the store error and returns a generic internal error response.
///
/// # Errors
/// - Does not fail.
pub fn api_internal(message: &str, err: &StoreError) -> ApiError {
    tracing::error!(error = ?err, "access-control storage error");
    error(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

/// Build a 500 Internal Server Error from a collaborator failure.
///
/// # Errors
/// - Does not fail.
pub fn api_dependency(err: &DependencyError) -> ApiError {
    tracing::error!(error = %err, "access-control dependency failure");
    error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal",
        "a dependent service failed while validating the request",
    )
}

/// Build a 401 Unauthorized error.
///
/// # Errors
/// - Does not fail.
pub fn api_unauthorized(message: &str) -> ApiError {
    error(StatusCode::UNAUTHORIZED, "unauthorized", message)
}

/// Build a 403 Forbidden error.
///
/// # Errors
/// - Does not fail.
pub fn api_forbidden(message: &str) -> ApiError {
    error(StatusCode::FORBIDDEN, "forbidden", message)
}

/// Build a 400 Bad Request error with a single message.
///
/// # Errors
/// - Does not fail.
pub fn api_validation_error(message: &str) -> ApiError {
    error(StatusCode::BAD_REQUEST, "validation_error", message)
}

/// Build a 400 Bad Request error listing every collected validation message.
///
/// # What it does
/// Keeps the path grouping of `errors`; root-level messages use an empty path.
///
/// # Errors
/// - Does not fail.
pub fn api_validation_errors(errors: &ValidationErrors) -> ApiError {
    let mut api = error(StatusCode::BAD_REQUEST, "validation_error", &errors.to_string());
    api.body.errors = errors
        .iter()
        .map(|(path, messages)| FieldErrors {
            path: path.to_string(),
            errors: messages.to_vec(),
        })
        .collect();
    api
}
