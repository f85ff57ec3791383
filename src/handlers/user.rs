use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::models::UserModel;
use crate::response::ApiResponse;
use crate::services::user::UserService;
use axum::{response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub role: String,
    pub created_at: String,
}

impl From<UserModel> for UserResponse {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            created_at: user.created_at.to_string(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized", body = crate::error::AppError),
    ),
    tag = "users"
)]
pub async fn get_current_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let user = UserService::new(db).get_by_id(auth_user.user_id).await?;
    Ok(ApiResponse::ok(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/me",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Account deleted"),
        (status = 401, description = "Unauthorized", body = crate::error::AppError),
    ),
    tag = "users"
)]
pub async fn delete_current_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let service = UserService::new(db);
    let user = service.get_by_id(auth_user.user_id).await?;
    service.soft_delete(user).await?;

    Ok(ApiResponse::message(format!(
        "User {} has been successfully deleted.",
        auth_user.username
    )))
}
