use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::services::post::PostService;
use axum::{extract::Path, response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct VoteResponse {
    pub post_id: i32,
    /// The post's rating after the vote
    pub rating: i32,
}

#[utoipa::path(
    patch,
    path = "/api/v1/posts/{id}/vote-up",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Vote recorded", body = VoteResponse),
        (status = 404, description = "Post not found", body = crate::error::AppError),
        (status = 409, description = "Already upvoted", body = crate::error::AppError),
    ),
    tag = "votes"
)]
pub async fn vote_up(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = PostService::new(db);
    let post = service.get_by_id(id).await?;
    let rating = service.vote_up(post, auth_user.user_id).await?;

    Ok(ApiResponse::ok(VoteResponse { post_id: id, rating }))
}

#[utoipa::path(
    patch,
    path = "/api/v1/posts/{id}/vote-down",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Vote recorded", body = VoteResponse),
        (status = 404, description = "Post not found", body = crate::error::AppError),
        (status = 409, description = "Already downvoted", body = crate::error::AppError),
    ),
    tag = "votes"
)]
pub async fn vote_down(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = PostService::new(db);
    let post = service.get_by_id(id).await?;
    let rating = service.vote_down(post, auth_user.user_id).await?;

    Ok(ApiResponse::ok(VoteResponse { post_id: id, rating }))
}
