use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Deserializer};
use tracing::info;

use common::types::ApiResponse;
use models::user::User;
use service::user::UpdateUser;

use crate::errors::ApiError;
use crate::extract::{JsonBody, UserIdPath};
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
}

/// Absent and empty fields both mean "keep the current value".
/// An explicit `null` is not a string and is rejected.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserInput {
    #[serde(default, deserialize_with = "present_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present_string")]
    pub email: Option<String>,
}

fn present_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    String::deserialize(d).map(Some)
}

impl From<UpdateUserInput> for UpdateUser {
    fn from(input: UpdateUserInput) -> Self {
        UpdateUser { name: input.name, email: input.email }
    }
}

#[utoipa::path(get, path = "/api/users", tag = "users", responses((status = 200, description = "All users in insertion order")))]
pub async fn list_users(State(state): State<AppState>) -> Json<ApiResponse<Vec<User>>> {
    let users = state.users.list().await;
    info!(count = users.len(), "list users");
    Json(ApiResponse::data(users))
}

#[utoipa::path(
    get, path = "/api/users/{id}", tag = "users",
    params(("id" = u64, Path, description = "User id")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::UserDoc),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.users.get(id).await?;
    Ok(Json(ApiResponse::data(user)))
}

#[utoipa::path(
    post, path = "/api/users", tag = "users",
    request_body = crate::openapi::CreateUserRequest,
    responses(
        (status = 201, description = "Created", body = crate::openapi::UserDoc),
        (status = 400, description = "Invalid body, empty field or duplicate email")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateUserInput>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let user = state.users.create(&input.name, &input.email).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(user).with_message("user created")),
    ))
}

#[utoipa::path(
    put, path = "/api/users/{id}", tag = "users",
    params(("id" = u64, Path, description = "User id")),
    request_body = crate::openapi::UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::UserDoc),
        (status = 400, description = "Invalid body or duplicate email"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
    JsonBody(input): JsonBody<UpdateUserInput>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.users.update(id, input.into()).await?;
    Ok(Json(ApiResponse::data(user).with_message("user updated")))
}

#[utoipa::path(
    delete, path = "/api/users/{id}", tag = "users",
    params(("id" = u64, Path, description = "User id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if !state.users.delete(id).await {
        return Err(ApiError::not_found("user not found"));
    }
    Ok(Json(ApiResponse::message("user deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::parse_json_object;

    #[test]
    fn update_input_treats_missing_as_absent_and_rejects_null() {
        let input: UpdateUserInput = parse_json_object(br#"{"name":"B2"}"#).unwrap();
        assert_eq!(input.name.as_deref(), Some("B2"));
        assert_eq!(input.email, None);

        let empty: UpdateUserInput = parse_json_object(b"{}").unwrap();
        assert_eq!(UpdateUser::from(empty), UpdateUser::default());

        for body in [&br#"{"name":null}"#[..], br#"{"email":null}"#, br#"{"name":1}"#] {
            assert!(parse_json_object::<UpdateUserInput>(body).is_err());
        }
    }
}
