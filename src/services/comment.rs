use crate::{
    error::{AppError, AppResult},
    models::{comment, Comment, CommentModel, PostModel},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder,
};
use std::collections::HashMap;

pub struct CommentService {
    db: DatabaseConnection,
}

impl CommentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All live comments, newest first.
    pub async fn list_all(&self) -> AppResult<Vec<CommentModel>> {
        let comments = Comment::find()
            .filter(comment::Column::Deleted.eq(false))
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_desc(comment::Column::Id)
            .all(&self.db)
            .await?;
        Ok(comments)
    }

    pub async fn list_for_post(&self, post_id: i32) -> AppResult<Vec<CommentModel>> {
        Self::list_for_post_in(&self.db, post_id).await
    }

    pub async fn list_for_post_in<C: ConnectionTrait>(
        conn: &C,
        post_id: i32,
    ) -> AppResult<Vec<CommentModel>> {
        let comments = Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::Deleted.eq(false))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(conn)
            .await?;
        Ok(comments)
    }

    /// Live comments for several posts at once, grouped by post id.
    pub async fn list_for_posts(
        &self,
        post_ids: &[i32],
    ) -> AppResult<HashMap<i32, Vec<CommentModel>>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let comments = Comment::find()
            .filter(comment::Column::PostId.is_in(post_ids.iter().copied()))
            .filter(comment::Column::Deleted.eq(false))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await?;

        let mut grouped: HashMap<i32, Vec<CommentModel>> = HashMap::new();
        for c in comments {
            grouped.entry(c.post_id).or_default().push(c);
        }
        Ok(grouped)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<CommentModel> {
        Comment::find_by_id(id)
            .filter(comment::Column::Deleted.eq(false))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(
        &self,
        post: &PostModel,
        user_id: i32,
        content: &str,
    ) -> AppResult<CommentModel> {
        let now = chrono::Utc::now().naive_utc();

        let new_comment = comment::ActiveModel {
            post_id: Set(post.id),
            user_id: Set(user_id),
            content: Set(content.to_string()),
            deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let comment = new_comment.insert(&self.db).await?;
        tracing::debug!(comment_id = comment.id, post_id = post.id, "Comment created");
        Ok(comment)
    }

    pub fn verify_author(&self, comment: &CommentModel, user_id: i32) -> AppResult<()> {
        if comment.user_id != user_id {
            return Err(AppError::AccessDenied(
                "Only the author can edit this comment.".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn update(&self, comment: CommentModel, content: &str) -> AppResult<CommentModel> {
        let now = chrono::Utc::now().naive_utc();

        let mut active: comment::ActiveModel = comment.into();
        active.content = Set(content.to_string());
        active.updated_at = Set(now);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    pub async fn soft_delete(&self, comment: CommentModel) -> AppResult<CommentModel> {
        Self::soft_delete_in(&self.db, comment).await
    }

    /// Flag the comment deleted. Comments own nothing, so nothing cascades.
    pub async fn soft_delete_in<C: ConnectionTrait>(
        conn: &C,
        comment: CommentModel,
    ) -> AppResult<CommentModel> {
        let mut active: comment::ActiveModel = comment.into();
        active.deleted = Set(true);
        active.updated_at = Set(chrono::Utc::now().naive_utc());
        Ok(active.update(conn).await?)
    }
}
