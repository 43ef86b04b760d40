use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::middleware::AuthUser;
use crate::auth::models::{AuthenticatedUser, Role};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::TokenKeys;
use crate::config::AuthConfig;
use crate::db::models::{NewUser, UserView};
use crate::db::user_repository::UserRepository;
use crate::error::AppError;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserView,
    pub token: String,
}

/// Check credentials and issue a session token.
///
/// Unknown users and wrong passwords fail with the same message.
pub async fn process_login(
    users: &dyn UserRepository,
    tokens: &TokenKeys,
    request: &LoginRequest,
) -> Result<LoginResponse, AppError> {
    let record = users
        .find_by_username(request.username.trim())
        .await?
        .ok_or_else(|| AppError::Auth(INVALID_CREDENTIALS.into()))?;

    if !verify_password(&request.password, &record.password_hash) {
        tracing::info!(username = %record.username, "rejected login");
        return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
    }

    let token = tokens.issue(&AuthenticatedUser {
        user_id: record.id,
        username: record.username.clone(),
        role: record.role,
    })?;

    tracing::info!(username = %record.username, role = %record.role, "user logged in");
    Ok(LoginResponse {
        user: UserView::from(&record),
        token,
    })
}

/// Axum handler for `POST /api/v1/auth/login`.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    process_login(state.users.as_ref(), &state.tokens, &request)
        .await
        .map(Json)
}

/// Axum handler for `GET /api/v1/auth/me`.
pub async fn me_handler(AuthUser(user): AuthUser) -> Json<AuthenticatedUser> {
    Json(user)
}

/// Create the configured admin account when no user exists yet.
///
/// Returns `true` when an account was created.
pub async fn bootstrap_admin(
    users: &dyn UserRepository,
    config: &AuthConfig,
) -> Result<bool, AppError> {
    let (Some(username), Some(password)) = (
        config.bootstrap_admin_username.as_deref(),
        config.bootstrap_admin_password.as_deref(),
    ) else {
        return Ok(false);
    };

    if users.count().await? > 0 {
        return Ok(false);
    }

    users
        .create(NewUser {
            username: username.to_string(),
            email: format!("{username}@localhost"),
            password_hash: hash_password(password)?,
            role: Role::Admin,
        })
        .await?;

    tracing::warn!(username, "created bootstrap admin account");
    Ok(true)
}
