use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String, pub message: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDoc {
    pub id: u64,
    pub name: String,
    pub email: String,
    /// `YYYY-MM-DD HH:MM:SS`, server-local time
    pub created_at: String,
    pub updated_at: String,
}

#[derive(ToSchema)]
pub struct CreateUserRequest { pub name: String, pub email: String }

/// Empty or missing fields keep their current value.
#[derive(ToSchema)]
pub struct UpdateUserRequest { pub name: Option<String>, pub email: Option<String> }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::users::list_users,
        crate::routes::users::get_user,
        crate::routes::users::create_user,
        crate::routes::users::update_user,
        crate::routes::users::delete_user,
    ),
    components(
        schemas(
            HealthResponse,
            UserDoc,
            CreateUserRequest,
            UpdateUserRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "users")
    )
)]
pub struct ApiDoc;
