use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

use crate::error::AppError;

/// Tables whose rows can be scheduled for later publication.
pub const SCHEDULED_TABLES: [&str; 3] = ["news", "works", "soon"];

/// Repository trait for the scheduled-publication sweep.
#[async_trait]
pub trait PublicationRepository: Send + Sync {
    /// Mark every unpublished row whose scheduled time is at or before `now`
    /// as published. Returns the number of rows changed.
    async fn publish_due(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

/// MySQL implementation of the PublicationRepository.
pub struct MySqlPublicationRepository {
    pool: MySqlPool,
}

impl MySqlPublicationRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PublicationRepository for MySqlPublicationRepository {
    async fn publish_due(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut published = 0;
        for table in SCHEDULED_TABLES {
            let result = sqlx::query(&format!(
                "UPDATE {table} SET isPublished = TRUE WHERE isPublished = FALSE \
                 AND scheduledPublishTime IS NOT NULL AND scheduledPublishTime <= ?"
            ))
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
            published += result.rows_affected();
        }
        Ok(published)
    }
}
