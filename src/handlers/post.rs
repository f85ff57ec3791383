use crate::error::{AppError, AppResult};
use crate::handlers::comment::CommentResponse;
use crate::middleware::AuthUser;
use crate::models::PostModel;
use crate::response::ApiResponse;
use crate::services::overview::{AuthorSummary, PostOverview};
use crate::services::post::{PostDetail, PostService};
use axum::{extract::Path, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Body for both creating and editing a post.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PostRequest {
    /// Post title (1-200 characters)
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters."))]
    pub title: String,
    /// Post content
    #[validate(length(min = 1, message = "Content is required."))]
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostResponse {
    /// Post ID
    pub id: i32,
    /// Author user ID
    pub user_id: i32,
    pub title: String,
    pub content: String,
    /// Sum of live votes
    pub rating: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PostModel> for PostResponse {
    fn from(p: PostModel) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            title: p.title,
            content: p.content,
            rating: p.rating,
            created_at: p.created_at.to_string(),
            updated_at: p.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostDetailResponse {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub rating: i32,
    pub author: AuthorSummary,
    pub created_at: String,
    pub updated_at: String,
    /// Live comments, oldest first
    pub comments: Vec<CommentResponse>,
}

impl From<PostDetail> for PostDetailResponse {
    fn from(detail: PostDetail) -> Self {
        let PostDetail {
            post,
            author,
            comments,
        } = detail;
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            rating: post.rating,
            author: AuthorSummary::from(&author),
            created_at: post.created_at.to_string(),
            updated_at: post.updated_at.to_string(),
            comments: comments.into_iter().map(CommentResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostListResponse {
    pub posts: Vec<PostOverview>,
}

#[utoipa::path(
    get,
    path = "/api/v1/posts",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Live posts ordered by rating", body = PostListResponse),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "posts"
)]
pub async fn list_posts(
    Extension(db): Extension<DatabaseConnection>,
    _auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let posts = PostService::new(db).list_overviews().await?;
    Ok(ApiResponse::ok(PostListResponse { posts }))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post details", body = PostDetailResponse),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn get_post(
    Extension(db): Extension<DatabaseConnection>,
    _auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let detail = PostService::new(db).get_detail(id).await?;
    Ok(ApiResponse::ok(PostDetailResponse::from(detail)))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts",
    security(("jwt_token" = [])),
    request_body = PostRequest,
    responses(
        (status = 200, description = "Post created", body = PostResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "posts"
)]
pub async fn create_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<PostRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let post = PostService::new(db)
        .create(auth_user.user_id, &payload.title, &payload.content)
        .await?;

    Ok(ApiResponse::ok(PostResponse::from(post)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/posts/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    request_body = PostRequest,
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn update_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<PostRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = PostService::new(db);
    let post = service.get_by_id(id).await?;
    service.verify_author(&post, auth_user.user_id)?;
    let post = service
        .update(post, &payload.title, &payload.content)
        .await?;

    Ok(ApiResponse::ok(PostResponse::from(post)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post, its comments and votes deleted"),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn delete_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = PostService::new(db);
    let post = service.get_by_id(id).await?;
    service.verify_author(&post, auth_user.user_id)?;
    service.soft_delete(post).await?;

    Ok(ApiResponse::message(format!(
        "Post with ID {id} has been successfully deleted."
    )))
}
