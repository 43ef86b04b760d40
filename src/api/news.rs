use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::middleware::AuthUser;
use crate::auth::models::Role;
use crate::db::models::{DeleteManyRequest, NewsInput, NewsItem};
use crate::db::news_repository::NewsRepository;
use crate::error::AppError;
use crate::publisher::is_published_now;
use crate::state::AppState;

/// Response of the bulk delete routes.
#[derive(Debug, Serialize)]
pub struct DeletedCount {
    pub deleted: u64,
}

/// Reject inputs no route can store.
pub(crate) fn validate_news_input(input: &NewsInput) -> Result<(), AppError> {
    if input.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title cannot be empty".into()));
    }
    Ok(())
}

pub(crate) fn validate_ids(ids: &[i64]) -> Result<(), AppError> {
    if ids.is_empty() {
        return Err(AppError::BadRequest("No ids provided".into()));
    }
    Ok(())
}

/// Create a post, deciding its publication status from `now`.
pub async fn process_create_news(
    repo: &dyn NewsRepository,
    input: &NewsInput,
    created_by: &str,
    now: DateTime<Utc>,
) -> Result<NewsItem, AppError> {
    validate_news_input(input)?;
    let published = is_published_now(
        input.publish_time.as_deref(),
        input.scheduled_publish_time,
        now,
    );
    let item = repo.create(input, published, created_by).await?;
    tracing::info!(id = item.id, published, created_by, "news created");
    Ok(item)
}

pub async fn process_update_news(
    repo: &dyn NewsRepository,
    id: i64,
    input: &NewsInput,
    now: DateTime<Utc>,
) -> Result<NewsItem, AppError> {
    validate_news_input(input)?;
    let published = is_published_now(
        input.publish_time.as_deref(),
        input.scheduled_publish_time,
        now,
    );
    repo.update(id, input, published)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("News {id} not found")))
}

/// Axum handler for `GET /api/v1/news`.
pub async fn list_news_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<NewsItem>>, AppError> {
    state.news.list_all().await.map(Json)
}

/// Axum handler for `GET /api/v1/news/{id}`.
pub async fn get_news_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<NewsItem>, AppError> {
    state
        .news
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("News {id} not found")))
}

/// Axum handler for `GET /api/v1/news/category/{category}`.
///
/// An empty category is reported as 404.
pub async fn news_by_category_handler(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<NewsItem>>, AppError> {
    let items = state.news.list_by_category(&category).await?;
    if items.is_empty() {
        return Err(AppError::NotFound(format!(
            "No news found in category '{category}'"
        )));
    }
    Ok(Json(items))
}

/// Axum handler for `POST /api/v1/news`.
pub async fn create_news_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<NewsInput>,
) -> Result<(StatusCode, Json<NewsItem>), AppError> {
    let user = auth.require(Role::Editor)?;
    let item = process_create_news(state.news.as_ref(), &input, &user.username, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Axum handler for `PUT /api/v1/news/{id}`.
pub async fn update_news_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(input): Json<NewsInput>,
) -> Result<Json<NewsItem>, AppError> {
    auth.require(Role::Editor)?;
    process_update_news(state.news.as_ref(), id, &input, Utc::now())
        .await
        .map(Json)
}

/// Axum handler for `DELETE /api/v1/news/{id}`.
pub async fn delete_news_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    auth.require(Role::Editor)?;
    if !state.news.delete(id).await? {
        return Err(AppError::NotFound(format!("News {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Axum handler for `POST /api/v1/news/delete-many`.
pub async fn delete_many_news_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<DeleteManyRequest>,
) -> Result<Json<DeletedCount>, AppError> {
    auth.require(Role::Editor)?;
    validate_ids(&request.ids)?;
    let deleted = state.news.delete_many(&request.ids).await?;
    tracing::info!(requested = request.ids.len(), deleted, "bulk news delete");
    Ok(Json(DeletedCount { deleted }))
}
