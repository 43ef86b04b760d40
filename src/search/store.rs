use async_trait::async_trait;
use sqlx::mysql::{MySql, MySqlArguments};
use sqlx::pool::PoolConnection;
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::MySqlPool;

use crate::error::AppError;
use crate::models::search::SearchRow;
use crate::search::assemble::CompiledQuery;
use crate::search::predicate::BindValue;

/// Source of leased connections for the search endpoint.
///
/// A leased [`SearchConnection`] goes back to the pool when dropped, so every
/// exit path of a search releases it.
#[async_trait]
pub trait SearchStore: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn SearchConnection>, AppError>;
}

/// A single leased connection running compiled search statements.
#[async_trait]
pub trait SearchConnection: Send {
    /// Run a `COUNT(*)` statement and return the count.
    async fn count(&mut self, query: &CompiledQuery) -> Result<u64, AppError>;

    /// Run a page statement and decode its rows.
    async fn fetch(&mut self, query: &CompiledQuery) -> Result<Vec<SearchRow>, AppError>;
}

/// MySQL implementation of the SearchStore.
pub struct MySqlSearchStore {
    pool: MySqlPool,
}

impl MySqlSearchStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchStore for MySqlSearchStore {
    async fn acquire(&self) -> Result<Box<dyn SearchConnection>, AppError> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AppError::Database(format!("Failed to acquire connection: {e}")))?;
        Ok(Box::new(MySqlSearchConnection { conn }))
    }
}

struct MySqlSearchConnection {
    conn: PoolConnection<MySql>,
}

#[async_trait]
impl SearchConnection for MySqlSearchConnection {
    async fn count(&mut self, query: &CompiledQuery) -> Result<u64, AppError> {
        let statement = bind_scalar(sqlx::query_scalar::<_, i64>(&query.sql), &query.binds);
        let total = statement
            .fetch_one(&mut *self.conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn fetch(&mut self, query: &CompiledQuery) -> Result<Vec<SearchRow>, AppError> {
        let statement = bind_rows(sqlx::query_as::<_, SearchRow>(&query.sql), &query.binds);
        statement
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

fn bind_scalar<'q>(
    mut query: QueryScalar<'q, MySql, i64, MySqlArguments>,
    binds: &[BindValue],
) -> QueryScalar<'q, MySql, i64, MySqlArguments> {
    for value in binds {
        query = match value {
            BindValue::Text(v) => query.bind(v.clone()),
            BindValue::Int(v) => query.bind(*v),
            BindValue::DateTime(v) => query.bind(*v),
        };
    }
    query
}

fn bind_rows<'q>(
    mut query: QueryAs<'q, MySql, SearchRow, MySqlArguments>,
    binds: &[BindValue],
) -> QueryAs<'q, MySql, SearchRow, MySqlArguments> {
    for value in binds {
        query = match value {
            BindValue::Text(v) => query.bind(v.clone()),
            BindValue::Int(v) => query.bind(*v),
            BindValue::DateTime(v) => query.bind(*v),
        };
    }
    query
}
