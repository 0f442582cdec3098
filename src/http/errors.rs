//! HTTP error handling and conversion

use crate::core::service::ServiceError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::HashMap;
use tracing::error;

/// HTTP error types
#[derive(Debug, Clone)]
pub enum HttpError {
    /// Authentication errors
    Unauthorized(String),

    /// Validation errors
    BadRequest(String),
    ValidationError(HashMap<String, Vec<String>>),

    /// Not found errors
    NotFound(String),

    /// Request body over the configured limit
    PayloadTooLarge(String),

    /// Server errors
    InternalServerError(String),
}

impl HttpError {
    /// Convert to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            HttpError::BadRequest(_) | HttpError::ValidationError(_) => StatusCode::BAD_REQUEST,
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            HttpError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a rejected Stremio login to `message`; other errors convert as usual
    pub fn from_credentials(err: ServiceError, message: &str) -> Self {
        match err {
            ServiceError::InvalidCredentials(_) => HttpError::Unauthorized(message.to_string()),
            other => other.into(),
        }
    }

    /// Build a [`HttpError::ValidationError`] from validator output
    pub fn from_validation(errors: validator::ValidationErrors) -> Self {
        HttpError::ValidationError(
            errors
                .field_errors()
                .into_iter()
                .map(|(field, errors)| {
                    (
                        field.to_string(),
                        errors
                            .iter()
                            .map(|e| {
                                e.message
                                    .clone()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            })
                            .collect(),
                    )
                })
                .collect(),
        )
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            HttpError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            HttpError::ValidationError(errors) => {
                write!(f, "Validation Error: {:?}", errors)
            }
            HttpError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            HttpError::PayloadTooLarge(msg) => write!(f, "Payload Too Large: {}", msg),
            HttpError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            HttpError::ValidationError(errors) => Json(json!({
                "error": "Validation failed",
                "details": errors
            })),
            HttpError::Unauthorized(msg)
            | HttpError::BadRequest(msg)
            | HttpError::NotFound(msg)
            | HttpError::PayloadTooLarge(msg)
            | HttpError::InternalServerError(msg) => Json(json!({ "error": msg })),
        };

        (status, body).into_response()
    }
}

/// Convert service errors to HTTP errors
impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => HttpError::BadRequest(msg),
            ServiceError::DuplicateAddon(_) => {
                HttpError::BadRequest("Addon already exists".to_string())
            }
            ServiceError::DuplicateUser(_) => {
                HttpError::BadRequest("User already exists".to_string())
            }
            ServiceError::AddonNotFound(_) => HttpError::NotFound("Addon not found".to_string()),
            ServiceError::UserNotFound(_) => HttpError::NotFound("User not found".to_string()),
            ServiceError::InvalidCredentials(_) => {
                HttpError::Unauthorized("Invalid credentials".to_string())
            }
            ServiceError::Registration(msg) => HttpError::BadRequest(msg),
            ServiceError::Fetch(msg)
            | ServiceError::Storage(msg)
            | ServiceError::Config(msg)
            | ServiceError::Internal(msg) => {
                error!("Request failed: {}", msg);
                HttpError::InternalServerError(msg)
            }
            ServiceError::Io(err) => {
                error!("Request failed with IO error: {}", err);
                HttpError::InternalServerError(err.to_string())
            }
        }
    }
}

/// Body rejections keep the `{error}` shape; oversized bodies stay 413
impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            HttpError::PayloadTooLarge(rejection.body_text())
        } else {
            HttpError::BadRequest(rejection.body_text())
        }
    }
}

/// Result type alias for HTTP operations
pub type HttpResult<T> = Result<T, HttpError>;
