use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ApiResponse;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::debug;

/// Returned for any body that is not valid JSON of the expected shape.
pub const INVALID_JSON_MESSAGE: &str = "invalid JSON body";
pub const NO_ROUTE_MESSAGE: &str = "no route";

/// Error leaving a handler, rendered as `{success:false, error}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn invalid_json() -> Self {
        Self::bad_request(INVALID_JSON_MESSAGE)
    }

    pub fn no_route() -> Self {
        Self::not_found(NO_ROUTE_MESSAGE)
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(msg) => Self::not_found(msg),
            ServiceError::InvalidArgument(msg) | ServiceError::Conflict(msg) => Self::bad_request(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        debug!(status = %self.status, error = %self.message, "request failed");
        (self.status, Json(ApiResponse::<()>::error(self.message))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
