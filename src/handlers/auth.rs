use crate::error::{AppError, AppResult};
use crate::response::ApiResponse;
use crate::services::auth::AuthService;
use crate::utils::JwtService;
use axum::{response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Username (3-50 characters)
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters."))]
    pub username: String,
    /// Password (min 6 characters)
    #[validate(length(min = 6, message = "Password must contain at least 6 characters."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required."))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    /// User ID
    pub user_id: i32,
    /// Username
    pub username: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    /// Username
    pub username: String,
    /// JWT access token
    pub token: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered successfully", body = RegisterResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 409, description = "Username already exists", body = AppError),
    ),
    tag = "users"
)]
pub async fn register(
    Extension(db): Extension<DatabaseConnection>,
    Extension(jwt): Extension<JwtService>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = AuthService::new(db, jwt);
    let user = service.register(&payload.username, &payload.password).await?;

    let message = format!("User {} successfully created.", user.username);
    Ok(ApiResponse::with_message(
        RegisterResponse {
            user_id: user.id,
            username: user.username,
        },
        message,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Invalid credentials", body = AppError),
    ),
    tag = "users"
)]
pub async fn login(
    Extension(db): Extension<DatabaseConnection>,
    Extension(jwt): Extension<JwtService>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = AuthService::new(db, jwt);
    let (user, token) = service.login(&payload.username, &payload.password).await?;

    Ok(ApiResponse::ok(AuthResponse {
        username: user.username,
        token,
    }))
}
