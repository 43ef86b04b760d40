use std::time::Duration;

use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;

use crate::config::DatabaseConfig;
use crate::error::AppError;

/// Open the connection pool. The pool size is the upper bound on concurrent
/// database work across all requests.
pub async fn connect(config: &DatabaseConfig) -> Result<MySqlPool, AppError> {
    MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.url)
        .await
        .map_err(|e| AppError::Database(format!("Failed to connect to database: {e}")))
}

/// Apply the embedded `migrations/`.
pub async fn migrate(pool: &MySqlPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to run migrations: {e}")))
}
