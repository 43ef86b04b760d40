use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::config::SearchConfig;
use crate::error::AppError;
use crate::models::search::SearchResponse;
use crate::search::filter::{SearchFilter, SearchRequest};
use crate::search::service::run_search;
use crate::search::store::SearchStore;
use crate::state::AppState;

/// Validate the request and run it against the store.
pub async fn process_search(
    store: &dyn SearchStore,
    limits: &SearchConfig,
    request: SearchRequest,
) -> Result<SearchResponse, AppError> {
    let filter = SearchFilter::from_raw(request.query, limits)?;

    tracing::debug!(
        words = filter.words.len(),
        any_words = filter.any_words.len(),
        exclude_words = filter.exclude_words.len(),
        categories = filter.categories.len(),
        phrase = filter.phrase.is_some(),
        sort = ?filter.sort,
        page = filter.page,
        limit = filter.limit,
        "running search"
    );

    run_search(store, &filter).await
}

/// Axum handler for `POST /api/v1/search`.
///
/// A body that is not valid JSON is a 400 like any other invalid input.
pub async fn search_handler(
    State(state): State<AppState>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, AppError> {
    let Json(request) =
        body.map_err(|e| AppError::BadRequest(format!("Invalid search request: {}", e.body_text())))?;

    process_search(state.search.as_ref(), &state.config.search, request)
        .await
        .map(Json)
}
