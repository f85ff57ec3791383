use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::CommentModel;
use crate::response::ApiResponse;
use crate::services::comment::CommentService;
use crate::services::post::PostService;
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCommentRequest {
    pub post_id: i32,
    #[validate(length(min = 1, message = "Comment content is required."))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, message = "Content is required."))]
    pub content: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentListQuery {
    /// Restrict to one post
    pub post_id: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentResponse {
    pub id: i32,
    pub post_id: i32,
    pub user_id: i32,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CommentModel> for CommentResponse {
    fn from(c: CommentModel) -> Self {
        Self {
            id: c.id,
            post_id: c.post_id,
            user_id: c.user_id,
            content: c.content,
            created_at: c.created_at.to_string(),
            updated_at: c.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentListResponse {
    pub comments: Vec<CommentResponse>,
}

#[utoipa::path(
    get,
    path = "/api/v1/comments",
    security(("jwt_token" = [])),
    params(("post_id" = Option<i32>, Query, description = "Post ID")),
    responses(
        (status = 200, description = "Live comments", body = CommentListResponse),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn list_comments(
    Extension(db): Extension<DatabaseConnection>,
    _auth_user: AuthUser,
    Query(params): Query<CommentListQuery>,
) -> AppResult<impl IntoResponse> {
    let service = CommentService::new(db.clone());

    let comments = match params.post_id {
        Some(post_id) => {
            let post = PostService::new(db).get_by_id(post_id).await?;
            service.list_for_post(post.id).await?
        }
        None => service.list_all().await?,
    };

    Ok(ApiResponse::ok(CommentListResponse {
        comments: comments.into_iter().map(CommentResponse::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/comments/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment", body = CommentResponse),
        (status = 404, description = "Comment not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn get_comment(
    Extension(db): Extension<DatabaseConnection>,
    _auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let comment = CommentService::new(db).get_by_id(id).await?;
    Ok(ApiResponse::ok(CommentResponse::from(comment)))
}

#[utoipa::path(
    post,
    path = "/api/v1/comments",
    security(("jwt_token" = [])),
    request_body = CreateCommentRequest,
    responses(
        (status = 200, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn create_comment(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<CreateCommentRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let post = PostService::new(db.clone()).get_by_id(payload.post_id).await?;
    let comment = CommentService::new(db)
        .create(&post, auth_user.user_id, &payload.content)
        .await?;

    Ok(ApiResponse::ok(CommentResponse::from(comment)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/comments/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Comment ID")),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Comment not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn update_comment(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCommentRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = CommentService::new(db);
    let comment = service.get_by_id(id).await?;
    service.verify_author(&comment, auth_user.user_id)?;
    let comment = service.update(comment, &payload.content).await?;

    Ok(ApiResponse::ok(CommentResponse::from(comment)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/comments/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Comment not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn delete_comment(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = CommentService::new(db);
    let comment = service.get_by_id(id).await?;
    service.verify_author(&comment, auth_user.user_id)?;
    service.soft_delete(comment).await?;

    Ok(ApiResponse::message(format!(
        "Comment with ID {id} has been successfully deleted."
    )))
}
