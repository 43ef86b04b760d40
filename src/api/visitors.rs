use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Path, State};
use axum::http::header::USER_AGENT;
use axum::http::{Extensions, HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;

use crate::auth::middleware::AuthUser;
use crate::auth::models::Role;
use crate::db::models::Visitor;
use crate::error::AppError;
use crate::state::AppState;

const FORWARDED_FOR: &str = "x-forwarded-for";
const UNKNOWN_ADDRESS: &str = "unknown";

#[derive(Debug, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitTotal {
    pub total_visits: i64,
}

/// Client address: first `X-Forwarded-For` hop, else the socket peer.
pub fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string())
}

/// Axum handler for `POST /api/v1/visitors`.
pub async fn record_visit_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    extensions: Extensions,
) -> Result<StatusCode, AppError> {
    let peer = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let address = client_address(&headers, peer);
    let user_agent = headers.get(USER_AGENT).and_then(|v| v.to_str().ok());

    state.visitors.record(&address, user_agent).await?;
    tracing::debug!(address = %address, "visit recorded");
    Ok(StatusCode::NO_CONTENT)
}

/// Axum handler for `GET /api/v1/visitors/total`.
///
/// Every call counts as a visit.
pub async fn total_visits_handler(
    State(state): State<AppState>,
) -> Result<Json<VisitTotal>, AppError> {
    let total_visits = state.visitors.increment_total().await?;
    Ok(Json(VisitTotal { total_visits }))
}

/// Axum handler for `GET /api/v1/visitors`.
pub async fn list_visitors_handler(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Visitor>>, AppError> {
    auth.require(Role::Editor)?;
    state.visitors.list().await.map(Json)
}

/// Axum handler for `DELETE /api/v1/visitors/{id}`.
pub async fn delete_visitor_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    auth.require(Role::Editor)?;
    if !state.visitors.delete(id).await? {
        return Err(AppError::NotFound(format!("Visitor {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
