use crate::models::{CommentModel, PostModel, UserModel};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AuthorSummary {
    pub id: i32,
    pub username: String,
}

impl From<&UserModel> for AuthorSummary {
    fn from(user: &UserModel) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// Listing-sized view of a post.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PostOverview {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub rating: i32,
    pub author: AuthorSummary,
    pub comment_count: usize,
}

/// Project a loaded post onto its overview. `comments` is the post's already-loaded
/// comment collection; only live entries are counted.
pub fn to_overview(post: &PostModel, author: &UserModel, comments: &[CommentModel]) -> PostOverview {
    PostOverview {
        id: post.id,
        title: post.title.clone(),
        content: post.content.clone(),
        created_at: post.created_at.to_string(),
        rating: post.rating,
        author: AuthorSummary::from(author),
        comment_count: comments
            .iter()
            .filter(|c| c.post_id == post.id && !c.deleted)
            .count(),
    }
}
