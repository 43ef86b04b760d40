use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::api::news::{validate_ids, DeletedCount};
use crate::auth::middleware::AuthUser;
use crate::auth::models::Role;
use crate::db::models::{
    CreatePersonRequest, CreatedPerson, PersonBasic, PersonBasicInput, PersonWithWorks,
};
use crate::db::person_repository::PersonRepository;
use crate::error::AppError;
use crate::publisher::is_published_now;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindPersonQuery {
    #[serde(default)]
    pub search_query: String,
}

/// Validate and store a person with one work and its media.
pub async fn process_create_person(
    repo: &dyn PersonRepository,
    request: &CreatePersonRequest,
    created_by: &str,
    now: DateTime<Utc>,
) -> Result<CreatedPerson, AppError> {
    if request.person.first_name.trim().is_empty() || request.person.last_name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "firstName and lastName are required".into(),
        ));
    }
    if request.work.title.trim().is_empty() {
        return Err(AppError::BadRequest("Work title cannot be empty".into()));
    }
    if let Some(media) = request.media.iter().find(|m| m.url.trim().is_empty()) {
        return Err(AppError::BadRequest(format!(
            "Media entry '{}' has no url",
            media.name.as_deref().unwrap_or("unnamed")
        )));
    }

    let published = is_published_now(
        request.work.publish_time.as_deref(),
        request.work.scheduled_publish_time,
        now,
    );
    let created = repo.create(request, published, created_by).await?;
    tracing::info!(
        person_id = created.person_id,
        work_id = created.work_id,
        media = request.media.len(),
        "person work created"
    );
    Ok(created)
}

/// Rewrite a person's names, biography and (when given) featured image.
pub async fn process_update_person(
    repo: &dyn PersonRepository,
    id: i64,
    input: &PersonBasicInput,
) -> Result<PersonBasic, AppError> {
    if input.first_name.trim().is_empty() || input.last_name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "firstName and lastName are required".into(),
        ));
    }
    let updated = repo
        .update_basic(id, input)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Person {id} not found")))?;
    tracing::info!(person_id = id, "person updated");
    Ok(updated)
}

/// Axum handler for `GET /api/v1/persons/basic`.
pub async fn list_basic_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<PersonBasic>>, AppError> {
    state.persons.list_basic().await.map(Json)
}

/// Axum handler for `GET /api/v1/persons/find?searchQuery=`.
pub async fn find_persons_handler(
    State(state): State<AppState>,
    Query(query): Query<FindPersonQuery>,
) -> Result<Json<Vec<PersonBasic>>, AppError> {
    let needle = query.search_query.trim();
    if needle.is_empty() {
        return Err(AppError::BadRequest("searchQuery cannot be empty".into()));
    }
    state.persons.find_by_name(needle).await.map(Json)
}

/// Axum handler for `GET /api/v1/persons`.
pub async fn list_persons_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<PersonWithWorks>>, AppError> {
    state.persons.list_with_works().await.map(Json)
}

/// Axum handler for `GET /api/v1/persons/{id}`.
pub async fn get_person_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PersonWithWorks>, AppError> {
    state
        .persons
        .find_with_works(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Person {id} not found")))
}

/// Axum handler for `POST /api/v1/persons`.
pub async fn create_person_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreatePersonRequest>,
) -> Result<(StatusCode, Json<CreatedPerson>), AppError> {
    let user = auth.require(Role::Editor)?;
    let created =
        process_create_person(state.persons.as_ref(), &request, &user.username, Utc::now())
            .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Axum handler for `PUT /api/v1/persons/{id}`.
pub async fn update_person_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(input): Json<PersonBasicInput>,
) -> Result<Json<PersonBasic>, AppError> {
    auth.require(Role::Editor)?;
    process_update_person(state.persons.as_ref(), id, &input)
        .await
        .map(Json)
}

/// Axum handler for `DELETE /api/v1/persons/{id}`.
pub async fn delete_person_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    auth.require(Role::Editor)?;
    if !state.persons.delete(id).await? {
        return Err(AppError::NotFound(format!("Person {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Axum handler for `POST /api/v1/persons/delete-many`.
pub async fn delete_many_persons_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<crate::db::models::DeleteManyRequest>,
) -> Result<Json<DeletedCount>, AppError> {
    auth.require(Role::Editor)?;
    validate_ids(&request.ids)?;
    let deleted = state.persons.delete_many(&request.ids).await?;
    tracing::info!(requested = request.ids.len(), deleted, "bulk person delete");
    Ok(Json(DeletedCount { deleted }))
}
