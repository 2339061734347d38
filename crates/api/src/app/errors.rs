//! Consistent error responses.
//!
//! Every failure leaves the API as `{success: false, message, details?}`.
//! Internal errors are logged in full and reported to clients generically.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

use stockroom_auth::AuthzError;
use stockroom_core::{DomainError, FieldError};

const INTERNAL_MESSAGE: &str = "Internal server error";

/// A domain failure on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        Self(err.into())
    }
}

/// Only bodies that are not a JSON object end up here; wrong field types are
/// reported by validation.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match &rejection {
            JsonRejection::JsonSyntaxError(_) => "Malformed JSON body",
            JsonRejection::JsonDataError(_) => "Request body must be a JSON object",
            JsonRejection::MissingJsonContentType(_) => {
                "Expected request with `Content-Type: application/json`"
            }
            _ => return Self(DomainError::bad_request(rejection.body_text())),
        };
        Self(DomainError::bad_request(message))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(DomainError::bad_request(rejection.body_text()))
    }
}

pub fn status_of(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::BadRequest(_) => StatusCode::BAD_REQUEST,
        DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_of(&self.0);
        let message = if status.is_server_error() {
            error!(error = %self.0, "request failed");
            INTERNAL_MESSAGE.to_string()
        } else {
            warn!(status = status.as_u16(), error = %self.0, "request rejected");
            self.0.to_string()
        };
        json_error(status, message, self.0.details())
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>, details: &[FieldError]) -> Response {
    let mut body = json!({
        "success": false,
        "message": message.into(),
    });
    if !details.is_empty() {
        body["details"] = json!(details);
    }
    (status, Json(body)).into_response()
}

/// Fallback for unknown routes.
pub async fn not_found() -> Response {
    json_error(StatusCode::NOT_FOUND, "Resource not found", &[])
}

/// Fallback for known paths hit with an unsupported method.
pub async fn method_not_allowed() -> Response {
    json_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed", &[])
}
