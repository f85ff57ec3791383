use crate::{
    error::{AppError, AppResult},
    models::{user, User, UserModel},
};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

pub struct UserService {
    db: DatabaseConnection,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<UserModel> {
        User::find_by_id(id)
            .filter(user::Column::Deleted.eq(false))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Flag the account deleted. Its posts, comments and votes are left alone.
    pub async fn soft_delete(&self, user: UserModel) -> AppResult<()> {
        let user_id = user.id;
        let mut active: user::ActiveModel = user.into();
        active.deleted = Set(true);
        active.update(&self.db).await?;

        tracing::info!(user_id, "User soft-deleted");
        Ok(())
    }
}
