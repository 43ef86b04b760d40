use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::auth::models::{AuthenticatedUser, Role};
use crate::auth::token::TokenKeys;
use crate::error::AppError;
use crate::state::AppState;

/// Extractor for routes that need a signed-in caller.
///
/// Reads `Authorization: Bearer <token>`; a missing, malformed, invalid or
/// expired token is rejected with 401 before the handler runs.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthenticatedUser);

impl AuthUser {
    /// Fail with 403 unless the caller has at least `role`.
    pub fn require(&self, role: Role) -> Result<&AuthenticatedUser, AppError> {
        if self.0.role.has_access(role) {
            Ok(&self.0)
        } else {
            Err(AppError::Forbidden(format!("Requires {role} role")))
        }
    }
}

/// Pull the bearer token out of an `Authorization` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AppError> {
    let header = header.ok_or_else(|| AppError::Auth("Missing bearer token".into()))?;
    let (scheme, token) = header
        .split_once(' ')
        .ok_or_else(|| AppError::Auth("Malformed authorization header".into()))?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return Err(AppError::Auth("Malformed authorization header".into()));
    }
    Ok(token.trim())
}

/// Resolve the caller from request headers.
pub fn authenticate(parts: &Parts, tokens: &TokenKeys) -> Result<AuthenticatedUser, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let token = bearer_token(header)?;
    Ok(tokens.verify(token)?.into())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, &state.tokens).map(AuthUser)
    }
}
