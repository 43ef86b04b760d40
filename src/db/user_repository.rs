use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

use crate::auth::models::Role;
use crate::db::models::{NewUser, UserRecord, UserUpdate};
use crate::db::news_repository::placeholders;
use crate::error::AppError;

/// Repository trait for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, AppError>;

    async fn list(&self) -> Result<Vec<UserRecord>, AppError>;

    /// Fails with `Conflict` when the username or email is taken.
    async fn create(&self, user: NewUser) -> Result<UserRecord, AppError>;

    /// Apply the set fields of `update`. Returns `None` when no user has this
    /// id; fails with `Conflict` when the new username or email is taken.
    async fn update(&self, id: i64, update: UserUpdate) -> Result<Option<UserRecord>, AppError>;

    /// Returns `false` when no user has this id.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    async fn delete_many(&self, ids: &[i64]) -> Result<u64, AppError>;

    async fn count(&self) -> Result<i64, AppError>;
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::from_str_ci(&row.role)
            .ok_or_else(|| AppError::Database(format!("unknown role '{}'", row.role)))?;
        Ok(UserRecord {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
        })
    }
}

const USER_COLUMNS: &str = "id, username, email, password_hash, CAST(role AS CHAR) AS role, created_at";

/// MySQL implementation of the UserRepository.
pub struct MySqlUserRepository {
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

/// Duplicate usernames or emails surface as `Conflict`.
fn write_error(e: sqlx::Error) -> AppError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => {
            AppError::Conflict("Username or email already exists".into())
        }
        _ => AppError::Database(e.to_string()),
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
        row.map(UserRecord::try_from).transpose()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
        row.map(UserRecord::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<UserRecord>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
        rows.into_iter().map(UserRecord::try_from).collect()
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, AppError> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, role) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        let id = result.last_insert_id() as i64;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database(format!("user {id} missing after insert")))
    }

    async fn update(&self, id: i64, update: UserUpdate) -> Result<Option<UserRecord>, AppError> {
        sqlx::query(
            "UPDATE users SET username = COALESCE(?, username), email = COALESCE(?, email), \
             password_hash = COALESCE(?, password_hash), role = COALESCE(?, role) WHERE id = ?",
        )
        .bind(&update.username)
        .bind(&update.email)
        .bind(&update.password_hash)
        .bind(update.role.map(|role| role.to_string()))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        self.find_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, ids: &[i64]) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let sql = format!("DELETE FROM users WHERE id IN ({})", placeholders(ids.len()));
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(*id);
        }
        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
