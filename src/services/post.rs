use crate::{
    error::{AppError, AppResult},
    models::{post, user, CommentModel, Post, PostModel, User, UserModel},
    services::{
        comment::CommentService,
        overview::{to_overview, PostOverview},
        vote::VoteService,
    },
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use std::collections::HashMap;

pub struct PostService {
    db: DatabaseConnection,
}

/// A post with everything the detail view shows.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: PostModel,
    pub author: UserModel,
    pub comments: Vec<CommentModel>,
}

impl PostService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn votes(&self) -> VoteService {
        VoteService::new(self.db.clone())
    }

    fn comments(&self) -> CommentService {
        CommentService::new(self.db.clone())
    }

    pub async fn create(&self, user_id: i32, title: &str, content: &str) -> AppResult<PostModel> {
        let now = chrono::Utc::now().naive_utc();

        let new_post = post::ActiveModel {
            user_id: Set(user_id),
            title: Set(title.to_string()),
            content: Set(content.to_string()),
            rating: Set(0),
            deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let post = new_post.insert(&self.db).await?;
        tracing::info!(post_id = post.id, user_id, "Post created");
        Ok(post)
    }

    /// Live post by id. Soft-deleted posts are reported as missing.
    pub async fn get_by_id(&self, id: i32) -> AppResult<PostModel> {
        Post::find_by_id(id)
            .filter(post::Column::Deleted.eq(false))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub fn verify_author(&self, post: &PostModel, user_id: i32) -> AppResult<()> {
        if post.user_id != user_id {
            return Err(AppError::AccessDenied(
                "Only the author can edit this post.".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn update(&self, post: PostModel, title: &str, content: &str) -> AppResult<PostModel> {
        let now = chrono::Utc::now().naive_utc();

        let mut active: post::ActiveModel = post.into();
        active.title = Set(title.to_string());
        active.content = Set(content.to_string());
        active.updated_at = Set(now);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Soft-delete a post together with its live comments and votes.
    ///
    /// The flag flips all happen in one transaction: either the post and every
    /// dependent end up deleted, or nothing changes.
    pub async fn soft_delete(&self, post: PostModel) -> AppResult<()> {
        let post_id = post.id;
        let txn = self.db.begin().await?;

        match Self::cascade_soft_delete(&txn, post).await {
            Ok((comment_count, vote_count)) => {
                txn.commit().await?;
                tracing::info!(post_id, comment_count, vote_count, "Post soft-deleted");
                Ok(())
            }
            Err(e) => {
                txn.rollback().await?;
                tracing::warn!(post_id, error = %e, "Post soft-delete rolled back");
                Err(e)
            }
        }
    }

    /// Flip the post and its live children. Returns (comments, votes) deleted.
    async fn cascade_soft_delete<C: ConnectionTrait>(
        conn: &C,
        post: PostModel,
    ) -> AppResult<(usize, usize)> {
        let post_id = post.id;

        let comments = CommentService::list_for_post_in(conn, post_id).await?;
        let comment_count = comments.len();
        for comment in comments {
            CommentService::soft_delete_in(conn, comment).await?;
        }

        let votes = VoteService::list_for_post(conn, post_id).await?;
        let vote_count = votes.len();
        for vote in votes {
            VoteService::soft_delete_in(conn, vote).await?;
        }

        let mut active: post::ActiveModel = post.into();
        active.deleted = Set(true);
        active.updated_at = Set(chrono::Utc::now().naive_utc());
        active.update(conn).await?;

        Ok((comment_count, vote_count))
    }

    /// Refresh and store the cached rating of every live post.
    pub async fn calculate_all_ratings(&self) -> AppResult<()> {
        let posts = Post::find()
            .filter(post::Column::Deleted.eq(false))
            .all(&self.db)
            .await?;

        let count = posts.len();
        for post in posts {
            VoteService::persist_rating(&self.db, post).await?;
        }

        tracing::debug!(count, "Ratings recalculated");
        Ok(())
    }

    /// Live posts, best rated first, with freshly recomputed ratings.
    pub async fn list_ordered_by_rating(&self) -> AppResult<Vec<PostModel>> {
        self.calculate_all_ratings().await?;

        let posts = Post::find()
            .filter(post::Column::Deleted.eq(false))
            .order_by_desc(post::Column::Rating)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await?;
        Ok(posts)
    }

    pub async fn list_overviews(&self) -> AppResult<Vec<PostOverview>> {
        let posts = self.list_ordered_by_rating().await?;

        let post_ids: Vec<i32> = posts.iter().map(|p| p.id).collect();
        let comments = self.comments().list_for_posts(&post_ids).await?;

        let author_ids: Vec<i32> = posts.iter().map(|p| p.user_id).collect();
        let authors = self.authors_by_id(&author_ids).await?;

        posts
            .iter()
            .map(|p| -> AppResult<PostOverview> {
                let author = authors
                    .get(&p.user_id)
                    .ok_or_else(|| missing_author(p))?;
                let post_comments = comments.get(&p.id).map(Vec::as_slice).unwrap_or(&[]);
                Ok(to_overview(p, author, post_comments))
            })
            .collect()
    }

    /// Recompute ratings, then load a live post with its author and live comments.
    pub async fn get_detail(&self, id: i32) -> AppResult<PostDetail> {
        self.calculate_all_ratings().await?;

        let post = self.get_by_id(id).await?;
        let author = User::find_by_id(post.user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| missing_author(&post))?;
        let comments = self.comments().list_for_post(post.id).await?;

        Ok(PostDetail {
            post,
            author,
            comments,
        })
    }

    /// Returns the post's new rating.
    pub async fn vote_up(&self, post: PostModel, user_id: i32) -> AppResult<i32> {
        let post = self.votes().vote_up(post, user_id).await?;
        Ok(post.rating)
    }

    /// Returns the post's new rating.
    pub async fn vote_down(&self, post: PostModel, user_id: i32) -> AppResult<i32> {
        let post = self.votes().vote_down(post, user_id).await?;
        Ok(post.rating)
    }

    async fn authors_by_id(&self, ids: &[i32]) -> AppResult<HashMap<i32, UserModel>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = User::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }
}

fn missing_author(post: &PostModel) -> AppError {
    AppError::Internal(anyhow::anyhow!(
        "Author {} of post {} does not exist",
        post.user_id,
        post.id
    ))
}
