use crate::{
    error::{AppError, AppResult},
    models::{post, vote, Post, PostModel, Vote, VoteModel},
};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait,
    DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, SqlErr, TransactionTrait,
};

pub const MIN_VOTE_VALUE: i16 = -1;
pub const MAX_VOTE_VALUE: i16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    fn delta(self) -> i16 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }

    /// One ±1 step from `current`, or `None` if that would leave the legal range.
    pub fn apply(self, current: i16) -> Option<i16> {
        let next = current + self.delta();
        (MIN_VOTE_VALUE..=MAX_VOTE_VALUE)
            .contains(&next)
            .then_some(next)
    }

    pub fn rejection(self) -> &'static str {
        match self {
            VoteDirection::Up => "You have already upvoted this post.",
            VoteDirection::Down => "You have already downvoted this post.",
        }
    }
}

pub struct VoteService {
    db: DatabaseConnection,
}

impl VoteService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn vote_up(&self, post: PostModel, user_id: i32) -> AppResult<PostModel> {
        self.vote(post, user_id, VoteDirection::Up).await
    }

    pub async fn vote_down(&self, post: PostModel, user_id: i32) -> AppResult<PostModel> {
        self.vote(post, user_id, VoteDirection::Down).await
    }

    /// Move the caller's vote one step in `direction`, then refresh and persist the
    /// post's cached rating. Returns the post carrying the new rating.
    ///
    /// A step that would leave [-1, 1] fails with `IllegalVote` before anything is
    /// written, so the stored vote keeps its previous value.
    pub async fn vote(
        &self,
        post: PostModel,
        user_id: i32,
        direction: VoteDirection,
    ) -> AppResult<PostModel> {
        let txn = self.db.begin().await?;

        let existing = Self::find_by_user_and_post(&txn, user_id, post.id).await?;
        // A soft-deleted vote no longer counts; voting again starts it over from 0.
        let current = existing
            .as_ref()
            .filter(|v| !v.deleted)
            .map(|v| v.value)
            .unwrap_or(0);

        let Some(new_value) = direction.apply(current) else {
            return Err(AppError::IllegalVote(direction.rejection().to_string()));
        };

        match existing {
            Some(existing) => {
                let mut active: vote::ActiveModel = existing.into();
                active.value = Set(new_value);
                active.deleted = Set(false);
                active.updated_at = Set(chrono::Utc::now().naive_utc());
                active.update(&txn).await?;
            }
            None => {
                Self::insert_vote(&txn, user_id, post.id, new_value, direction).await?;
            }
        }

        let post = Self::persist_rating(&txn, post).await?;
        txn.commit().await?;

        tracing::debug!(
            post_id = post.id,
            user_id,
            old_value = current,
            new_value,
            rating = post.rating,
            "Vote applied"
        );

        Ok(post)
    }

    /// Insert a first vote for (user, post). Losing a race against a concurrent first
    /// vote hits the composite primary key and is reported as `IllegalVote`.
    pub async fn insert_vote<C: ConnectionTrait>(
        conn: &C,
        user_id: i32,
        post_id: i32,
        value: i16,
        direction: VoteDirection,
    ) -> AppResult<()> {
        let now = chrono::Utc::now().naive_utc();
        let new_vote = vote::ActiveModel {
            user_id: Set(user_id),
            post_id: Set(post_id),
            value: Set(value),
            deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Vote::insert(new_vote)
            .exec_without_returning(conn)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    AppError::IllegalVote(direction.rejection().to_string())
                }
                _ => AppError::Database(e),
            })?;
        Ok(())
    }

    pub async fn find_by_user_and_post<C: ConnectionTrait>(
        conn: &C,
        user_id: i32,
        post_id: i32,
    ) -> AppResult<Option<VoteModel>> {
        Ok(Vote::find_by_id((user_id, post_id)).one(conn).await?)
    }

    /// Live votes attached to a post.
    pub async fn list_for_post<C: ConnectionTrait>(
        conn: &C,
        post_id: i32,
    ) -> AppResult<Vec<VoteModel>> {
        let votes = Vote::find()
            .filter(vote::Column::PostId.eq(post_id))
            .filter(vote::Column::Deleted.eq(false))
            .all(conn)
            .await?;
        Ok(votes)
    }

    /// Sum of live vote values for a post; 0 when it has none.
    pub async fn sum_vote_values_for_post<C: ConnectionTrait>(
        conn: &C,
        post_id: i32,
    ) -> AppResult<i32> {
        let sum: Option<Option<i64>> = Vote::find()
            .select_only()
            .column_as(Expr::col(vote::Column::Value).sum(), "rating")
            .filter(vote::Column::PostId.eq(post_id))
            .filter(vote::Column::Deleted.eq(false))
            .into_tuple()
            .one(conn)
            .await?;

        rating_from_sum(post_id, sum.flatten().unwrap_or(0))
    }

    /// Set `post.rating` from the live votes. Touches nothing but the in-memory model.
    pub async fn calculate_rating_for_post<C: ConnectionTrait>(
        conn: &C,
        mut post: PostModel,
    ) -> AppResult<PostModel> {
        post.rating = Self::sum_vote_values_for_post(conn, post.id).await?;
        Ok(post)
    }

    /// Recompute the rating and write it to the post row.
    pub async fn persist_rating<C: ConnectionTrait>(
        conn: &C,
        post: PostModel,
    ) -> AppResult<PostModel> {
        let post = Self::calculate_rating_for_post(conn, post).await?;

        Post::update_many()
            .col_expr(post::Column::Rating, Expr::value(post.rating))
            .filter(post::Column::Id.eq(post.id))
            .exec(conn)
            .await?;

        Ok(post)
    }

    pub async fn soft_delete(&self, vote: VoteModel) -> AppResult<VoteModel> {
        Self::soft_delete_in(&self.db, vote).await
    }

    pub async fn soft_delete_in<C: ConnectionTrait>(
        conn: &C,
        vote: VoteModel,
    ) -> AppResult<VoteModel> {
        let mut active: vote::ActiveModel = vote.into();
        active.deleted = Set(true);
        active.updated_at = Set(chrono::Utc::now().naive_utc());
        Ok(active.update(conn).await?)
    }
}

fn rating_from_sum(post_id: i32, sum: i64) -> AppResult<i32> {
    i32::try_from(sum).map_err(|_| {
        AppError::Internal(anyhow::anyhow!(
            "Rating of post {} overflows i32: {}",
            post_id,
            sum
        ))
    })
}
