use crate::{
    error::{AppError, AppResult},
    models::{user, User, UserModel},
    utils::{hash_password, verify_password, JwtService},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, SqlErr,
};

pub const DEFAULT_ROLE: &str = "user";

pub struct AuthService {
    db: DatabaseConnection,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(db: DatabaseConnection, jwt: JwtService) -> Self {
        Self { db, jwt }
    }

    /// Register a new user. Usernames stay reserved after the account is deleted.
    pub async fn register(&self, username: &str, password: &str) -> AppResult<UserModel> {
        if self.username_taken(username).await? {
            return Err(username_taken(username));
        }

        let password_hash = hash_password(password)?;
        let now = chrono::Utc::now().naive_utc();

        let new_user = user::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            role: Set(DEFAULT_ROLE.to_string()),
            deleted: Set(false),
            created_at: Set(now),
            ..Default::default()
        };

        // The unique index still decides when two registrations race.
        let user = new_user.insert(&self.db).await.map_err(|e| {
            match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => username_taken(username),
                _ => AppError::Database(e),
            }
        })?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Check credentials and issue a token. Returns (user_model, token).
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(UserModel, String)> {
        let user = User::find()
            .filter(user::Column::Username.eq(username))
            .filter(user::Column::Deleted.eq(false))
            .one(&self.db)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.jwt.encode_token(user.id, &user.username)?;
        Ok((user, token))
    }

    async fn username_taken(&self, username: &str) -> AppResult<bool> {
        let count = User::find()
            .filter(user::Column::Username.eq(username))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }
}

fn username_taken(username: &str) -> AppError {
    AppError::AlreadyExists(format!("Username {username} is already taken."))
}
