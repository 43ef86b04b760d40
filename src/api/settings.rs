use axum::extract::State;
use axum::Json;

use crate::auth::middleware::AuthUser;
use crate::auth::models::Role;
use crate::db::models::{
    FooterCompany, FooterCompanyInput, HeaderConfig, HeaderUpdate, TextSettings, ThemeSettings,
};
use crate::error::AppError;
use crate::state::AppState;

/// Theme colors must be CSS hex colors (`#rgb`, `#rrggbb` or `#rrggbbaa`).
fn validate_color(field: &str, value: &str) -> Result<(), AppError> {
    let hex = value.strip_prefix('#').unwrap_or("");
    let valid = matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(AppError::BadRequest(format!(
            "{field} must be a hex color, got '{value}'"
        )));
    }
    Ok(())
}

pub(crate) fn validate_theme(theme: &ThemeSettings) -> Result<(), AppError> {
    validate_color("headerColor", &theme.header_color)?;
    validate_color("footerColor", &theme.footer_color)?;
    validate_color("headerTextColor", &theme.header_text_color)?;
    validate_color("footerTextColor", &theme.footer_text_color)
}

/// Axum handler for `GET /api/v1/settings/theme`.
pub async fn get_theme_handler(
    State(state): State<AppState>,
) -> Result<Json<ThemeSettings>, AppError> {
    state
        .settings
        .get_theme()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Theme settings not found".into()))
}

/// Axum handler for `PUT /api/v1/settings/theme`.
pub async fn put_theme_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(theme): Json<ThemeSettings>,
) -> Result<Json<ThemeSettings>, AppError> {
    auth.require(Role::Editor)?;
    validate_theme(&theme)?;
    state.settings.set_theme(&theme).await?;
    Ok(Json(theme))
}

/// Axum handler for `GET /api/v1/settings/text`.
pub async fn get_text_handler(
    State(state): State<AppState>,
) -> Result<Json<TextSettings>, AppError> {
    state
        .settings
        .get_text()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Text settings not found".into()))
}

/// Axum handler for `PUT /api/v1/settings/text`.
pub async fn put_text_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(text): Json<TextSettings>,
) -> Result<Json<TextSettings>, AppError> {
    auth.require(Role::Editor)?;
    state.settings.set_text(&text).await?;
    Ok(Json(text))
}

/// Axum handler for `GET /api/v1/settings/header`.
pub async fn get_header_handler(
    State(state): State<AppState>,
) -> Result<Json<HeaderConfig>, AppError> {
    state
        .settings
        .get_header()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Header configuration not found".into()))
}

/// Axum handler for `PUT /api/v1/settings/header`.
pub async fn put_header_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(header): Json<HeaderUpdate>,
) -> Result<Json<HeaderConfig>, AppError> {
    auth.require(Role::Editor)?;
    state.settings.set_header(&header).await.map(Json)
}

/// Axum handler for `GET /api/v1/settings/footer`.
pub async fn get_footer_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<FooterCompany>>, AppError> {
    let companies = state.settings.list_footer().await?;
    if companies.is_empty() {
        return Err(AppError::NotFound("No footer companies".into()));
    }
    Ok(Json(companies))
}

/// Axum handler for `PUT /api/v1/settings/footer`.
pub async fn put_footer_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(companies): Json<Vec<FooterCompanyInput>>,
) -> Result<Json<Vec<FooterCompany>>, AppError> {
    auth.require(Role::Editor)?;
    if let Some(blank) = companies.iter().position(|c| c.company.trim().is_empty()) {
        return Err(AppError::BadRequest(format!(
            "Footer entry {blank} has no company name"
        )));
    }
    state.settings.upsert_footer(&companies).await.map(Json)
}
