use crate::error::AppError;
use crate::models::search::SearchResponse;
use crate::search::assemble::SearchPlan;
use crate::search::filter::SearchFilter;
use crate::search::pagination::Pagination;
use crate::search::store::SearchStore;

/// Count, paginate and fetch one page of the unioned search.
///
/// Both statements run on the same leased connection, which is released when
/// this function returns, successfully or not.
pub async fn run_search(
    store: &dyn SearchStore,
    filter: &SearchFilter,
) -> Result<SearchResponse, AppError> {
    let plan = SearchPlan::new(filter);

    let mut conn = store.acquire().await?;
    let total = conn.count(&plan.count_query()).await?;
    let pagination = Pagination::compute(total, filter.page, filter.limit);

    if pagination.is_empty() {
        return Ok(SearchResponse::empty());
    }

    let data = conn.fetch(&plan.page_query(&pagination)).await?;

    tracing::debug!(
        total,
        pages = pagination.pages,
        page = pagination.page,
        returned = data.len(),
        "search completed"
    );

    Ok(SearchResponse {
        data,
        total_results: total,
        pages: pagination.pages,
    })
}
