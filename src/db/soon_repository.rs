use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::db::models::{Announcement, NewsInput};
use crate::db::news_repository::NEWS_COLUMNS;
use crate::error::AppError;

/// Repository trait for the single page announcement.
#[async_trait]
pub trait SoonRepository: Send + Sync {
    /// The announcement, if one was ever written.
    async fn get(&self) -> Result<Option<Announcement>, AppError>;

    /// Replace the announcement, creating it on first write.
    async fn upsert(
        &self,
        input: &NewsInput,
        is_published: bool,
        created_by: &str,
    ) -> Result<Announcement, AppError>;
}

/// MySQL implementation of the SoonRepository.
pub struct MySqlSoonRepository {
    pool: MySqlPool,
}

impl MySqlSoonRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SoonRepository for MySqlSoonRepository {
    async fn get(&self) -> Result<Option<Announcement>, AppError> {
        sqlx::query_as::<_, Announcement>(&format!(
            "SELECT {NEWS_COLUMNS} FROM soon ORDER BY id ASC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn upsert(
        &self,
        input: &NewsInput,
        is_published: bool,
        created_by: &str,
    ) -> Result<Announcement, AppError> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM soon ORDER BY id ASC LIMIT 1 FOR UPDATE")
            .fetch_optional(&mut *tx)
            .await?;

        let id = match existing {
            Some(id) => {
                sqlx::query(
                    "UPDATE soon SET category = ?, title = ?, content = ?, publishTime = ?, \
                     scheduledPublishTime = ?, externalSource = ?, visibility = ?, \
                     isPublished = ?, featured = COALESCE(?, featured) WHERE id = ?",
                )
                .bind(&input.category)
                .bind(&input.title)
                .bind(&input.content)
                .bind(&input.publish_time)
                .bind(input.scheduled_publish_time)
                .bind(&input.external_source)
                .bind(&input.visibility)
                .bind(is_published)
                .bind(&input.featured)
                .bind(id)
                .execute(&mut *tx)
                .await?;
                id
            }
            None => {
                let result = sqlx::query(
                    "INSERT INTO soon (category, title, content, publishTime, \
                     scheduledPublishTime, externalSource, visibility, isPublished, featured, \
                     createdBy) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(&input.category)
                .bind(&input.title)
                .bind(&input.content)
                .bind(&input.publish_time)
                .bind(input.scheduled_publish_time)
                .bind(&input.external_source)
                .bind(&input.visibility)
                .bind(is_published)
                .bind(&input.featured)
                .bind(created_by)
                .execute(&mut *tx)
                .await?;
                result.last_insert_id() as i64
            }
        };

        let announcement = sqlx::query_as::<_, Announcement>(&format!(
            "SELECT {NEWS_COLUMNS} FROM soon WHERE id = ?"
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(announcement)
    }
}
