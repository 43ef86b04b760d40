use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::db::models::{NewsInput, NewsItem};
use crate::error::AppError;

/// Repository trait for news posts.
///
/// This trait allows mocking the database layer in tests.
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// All news, newest first.
    async fn list_all(&self) -> Result<Vec<NewsItem>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<NewsItem>, AppError>;

    /// News of one category, newest first.
    async fn list_by_category(&self, category: &str) -> Result<Vec<NewsItem>, AppError>;

    async fn create(
        &self,
        input: &NewsInput,
        is_published: bool,
        created_by: &str,
    ) -> Result<NewsItem, AppError>;

    /// Returns `None` when no post has this id.
    async fn update(
        &self,
        id: i64,
        input: &NewsInput,
        is_published: bool,
    ) -> Result<Option<NewsItem>, AppError>;

    /// Returns `false` when no post has this id.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Delete every listed post in one transaction; returns the number removed.
    async fn delete_many(&self, ids: &[i64]) -> Result<u64, AppError>;
}

pub(crate) const NEWS_COLUMNS: &str = "id, category, title, content, publishTime, \
    scheduledPublishTime, externalSource, visibility, isPublished, featured, createdBy, created_at";

/// `?, ?, ...` for an `IN` list.
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// MySQL implementation of the NewsRepository.
pub struct MySqlNewsRepository {
    pool: MySqlPool,
}

impl MySqlNewsRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NewsRepository for MySqlNewsRepository {
    async fn list_all(&self) -> Result<Vec<NewsItem>, AppError> {
        sqlx::query_as::<_, NewsItem>(&format!(
            "SELECT {NEWS_COLUMNS} FROM news ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<NewsItem>, AppError> {
        sqlx::query_as::<_, NewsItem>(&format!("SELECT {NEWS_COLUMNS} FROM news WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<NewsItem>, AppError> {
        sqlx::query_as::<_, NewsItem>(&format!(
            "SELECT {NEWS_COLUMNS} FROM news WHERE category = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn create(
        &self,
        input: &NewsInput,
        is_published: bool,
        created_by: &str,
    ) -> Result<NewsItem, AppError> {
        let result = sqlx::query(
            "INSERT INTO news (category, title, content, publishTime, scheduledPublishTime, \
             externalSource, visibility, isPublished, featured, createdBy) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
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
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let id = result.last_insert_id() as i64;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database(format!("news {id} missing after insert")))
    }

    async fn update(
        &self,
        id: i64,
        input: &NewsInput,
        is_published: bool,
    ) -> Result<Option<NewsItem>, AppError> {
        if self.find_by_id(id).await?.is_none() {
            return Ok(None);
        }

        sqlx::query(
            "UPDATE news SET category = ?, title = ?, content = ?, publishTime = ?, \
             scheduledPublishTime = ?, externalSource = ?, visibility = ?, isPublished = ?, \
             featured = COALESCE(?, featured) WHERE id = ?",
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
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM news WHERE id = ?")
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

        let mut tx = self.pool.begin().await?;
        let sql = format!("DELETE FROM news WHERE id IN ({})", placeholders(ids.len()));
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(*id);
        }
        let result = query.execute(&mut *tx).await?;
        tx.commit().await?;

        Ok(result.rows_affected())
    }
}
