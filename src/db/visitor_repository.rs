use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::db::models::Visitor;
use crate::error::AppError;

/// Repository trait for visitor tracking.
#[async_trait]
pub trait VisitorRepository: Send + Sync {
    /// Insert a visitor, or bump `count` and `last_visit` for a known address.
    async fn record(&self, ip_address: &str, system_info: Option<&str>) -> Result<(), AppError>;

    /// Increment the site-wide counter and return the new total.
    async fn increment_total(&self) -> Result<i64, AppError>;

    /// All visitors, most recent first.
    async fn list(&self) -> Result<Vec<Visitor>, AppError>;

    /// Returns `false` when no visitor has this id.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

/// MySQL implementation of the VisitorRepository.
pub struct MySqlVisitorRepository {
    pool: MySqlPool,
}

impl MySqlVisitorRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisitorRepository for MySqlVisitorRepository {
    async fn record(&self, ip_address: &str, system_info: Option<&str>) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO visitors (ip_address, system_info) VALUES (?, ?) \
             ON DUPLICATE KEY UPDATE count = count + 1, last_visit = CURRENT_TIMESTAMP, \
             system_info = COALESCE(VALUES(system_info), system_info)",
        )
        .bind(ip_address)
        .bind(system_info)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn increment_total(&self) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO visit_count (id, total_visits) VALUES (1, 1) \
             ON DUPLICATE KEY UPDATE total_visits = total_visits + 1",
        )
        .execute(&mut *tx)
        .await?;
        let total: i64 = sqlx::query_scalar("SELECT total_visits FROM visit_count WHERE id = 1")
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(total)
    }

    async fn list(&self) -> Result<Vec<Visitor>, AppError> {
        sqlx::query_as::<_, Visitor>(
            "SELECT id, ip_address, system_info, count, first_visit, last_visit \
             FROM visitors ORDER BY last_visit DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM visitors WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }
}
