//! Request extractors that reject with the JSON error envelope instead of
//! axum's plain-text rejections.

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use models::user::UserId;

use crate::errors::ApiError;

/// `{id}` path segment. Only one or more ASCII digits count as a match;
/// anything else is answered exactly like an unknown route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserIdPath(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for UserIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::no_route())?;
        parse_user_id(&raw)
    }
}

pub fn parse_user_id(raw: &str) -> Result<UserIdPath, ApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::no_route());
    }
    // all digits but too large for an id: no such user can exist
    raw.parse::<UserId>()
        .map(UserIdPath)
        .map_err(|_| ApiError::not_found("user not found"))
}

/// JSON object body parsed regardless of `Content-Type`; every failure,
/// including a non-object top level, maps to the fixed invalid-JSON error.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            debug!(error = %e, "failed to read request body");
            ApiError::invalid_json()
        })?;
        parse_json_object(&bytes).map(JsonBody)
    }
}

/// Only a top-level object is accepted; serde would otherwise fill a struct
/// positionally from an array.
pub fn parse_json_object<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| {
        debug!(error = %e, "rejecting request body");
        ApiError::invalid_json()
    })?;
    if !value.is_object() {
        debug!("rejecting non-object request body");
        return Err(ApiError::invalid_json());
    }
    serde_json::from_value(value).map_err(|e| {
        debug!(error = %e, "rejecting request body");
        ApiError::invalid_json()
    })
}
