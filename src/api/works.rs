use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};

use crate::api::upload::storage_key_for_url;
use crate::auth::middleware::AuthUser;
use crate::auth::models::Role;
use crate::db::models::{Work, WorkInput, WorkWithMedia};
use crate::db::person_repository::PersonRepository;
use crate::error::AppError;
use crate::publisher::is_published_now;
use crate::state::AppState;
use crate::storage::client::StorageClient;

/// Rewrite a work, deciding its publication status from `now`.
pub async fn process_update_work(
    repo: &dyn PersonRepository,
    id: i64,
    input: &WorkInput,
    now: DateTime<Utc>,
) -> Result<Work, AppError> {
    if input.title.trim().is_empty() {
        return Err(AppError::BadRequest("Work title cannot be empty".into()));
    }
    let published = is_published_now(
        input.publish_time.as_deref(),
        input.scheduled_publish_time,
        now,
    );
    let work = repo
        .update_work(id, input, published)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Work {id} not found")))?;
    tracing::info!(work_id = id, published, "work updated");
    Ok(work)
}

/// Remove a media row and, when it points at an uploaded file, the file.
///
/// Links to external hosts only lose their row.
pub async fn process_delete_media(
    repo: &dyn PersonRepository,
    storage: &dyn StorageClient,
    public_base_url: &str,
    id: i64,
) -> Result<(), AppError> {
    let media = repo
        .find_media(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Media {id} not found")))?;

    if let Some(key) = storage_key_for_url(public_base_url, &media.url) {
        storage.delete_object(&key).await?;
        tracing::debug!(%key, "deleted media object");
    }
    if !repo.delete_media(id).await? {
        return Err(AppError::NotFound(format!("Media {id} not found")));
    }
    tracing::info!(media_id = id, work_id = media.work_id, "media deleted");
    Ok(())
}

/// Axum handler for `GET /api/v1/works/{id}`.
pub async fn get_work_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<WorkWithMedia>, AppError> {
    state
        .persons
        .find_work(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Work {id} not found")))
}

/// Axum handler for `PUT /api/v1/works/{id}`.
pub async fn update_work_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(input): Json<WorkInput>,
) -> Result<Json<Work>, AppError> {
    auth.require(Role::Editor)?;
    process_update_work(state.persons.as_ref(), id, &input, Utc::now())
        .await
        .map(Json)
}

/// Axum handler for `DELETE /api/v1/works/{id}`.
pub async fn delete_work_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    auth.require(Role::Editor)?;
    if !state.persons.delete_work(id).await? {
        return Err(AppError::NotFound(format!("Work {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Axum handler for `DELETE /api/v1/media/{id}`.
pub async fn delete_media_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    auth.require(Role::Editor)?;
    process_delete_media(
        state.persons.as_ref(),
        state.storage.as_ref(),
        &state.config.storage.public_base_url,
        id,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
