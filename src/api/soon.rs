use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::api::news::validate_news_input;
use crate::auth::middleware::AuthUser;
use crate::auth::models::Role;
use crate::db::models::{Announcement, NewsInput};
use crate::error::AppError;
use crate::publisher::is_published_now;
use crate::state::AppState;

/// Axum handler for `GET /api/v1/soon`.
pub async fn get_soon_handler(
    State(state): State<AppState>,
) -> Result<Json<Announcement>, AppError> {
    state
        .soon
        .get()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No announcement".into()))
}

/// Axum handler for `PUT /api/v1/soon`.
pub async fn put_soon_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<NewsInput>,
) -> Result<Json<Announcement>, AppError> {
    let user = auth.require(Role::Editor)?;
    validate_news_input(&input)?;

    let published = is_published_now(
        input.publish_time.as_deref(),
        input.scheduled_publish_time,
        Utc::now(),
    );
    let announcement = state.soon.upsert(&input, published, &user.username).await?;
    tracing::info!(published, "announcement updated");
    Ok(Json(announcement))
}
