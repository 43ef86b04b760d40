use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::api::news::{validate_ids, DeletedCount};
use crate::auth::middleware::AuthUser;
use crate::auth::models::{AuthenticatedUser, Role};
use crate::auth::password::hash_password;
use crate::db::models::{DeleteManyRequest, NewUser, UserUpdate, UserView};
use crate::db::user_repository::UserRepository;
use crate::error::AppError;
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Body of the account update routes. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

fn check_username(username: &str) -> Result<&str, AppError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::BadRequest("Username cannot be empty".into()));
    }
    Ok(username)
}

fn check_email(email: &str) -> Result<&str, AppError> {
    let email = email.trim();
    if !email.contains('@') {
        return Err(AppError::BadRequest(format!("Invalid email '{email}'")));
    }
    Ok(email)
}

fn hash_checked_password(password: &str) -> Result<String, AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    hash_password(password)
}

fn parse_role(role: &str) -> Result<Role, AppError> {
    Role::from_str_ci(role).ok_or_else(|| {
        AppError::BadRequest(format!("Invalid role '{role}'. Expected: admin, editor, user"))
    })
}

/// Admins may read any account, everyone else only their own.
fn check_account_access(caller: &AuthenticatedUser, id: i64) -> Result<(), AppError> {
    if caller.role.has_access(Role::Admin) || caller.user_id == id {
        Ok(())
    } else {
        Err(AppError::Forbidden("Cannot access another user's account".into()))
    }
}

/// Validate, hash and store a new account.
pub async fn process_create_user(
    repo: &dyn UserRepository,
    request: CreateUserRequest,
) -> Result<UserView, AppError> {
    let username = check_username(&request.username)?;
    let email = check_email(&request.email)?;
    let password_hash = hash_checked_password(&request.password)?;
    let role = parse_role(&request.role)?;

    let record = repo
        .create(NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            role,
        })
        .await?;

    tracing::info!(username = %record.username, role = %record.role, "user created");
    Ok(UserView::from(&record))
}

/// Apply `request` to account `id` on behalf of `caller`.
///
/// Non-admins may only edit their own account and never their role.
pub async fn process_update_user(
    repo: &dyn UserRepository,
    caller: &AuthenticatedUser,
    id: i64,
    request: UpdateUserRequest,
) -> Result<UserView, AppError> {
    check_account_access(caller, id)?;

    let role = request.role.as_deref().map(parse_role).transpose()?;
    if role.is_some() && !caller.role.has_access(Role::Admin) {
        return Err(AppError::Forbidden("Only admins can change roles".into()));
    }
    let update = UserUpdate {
        username: request
            .username
            .as_deref()
            .map(check_username)
            .transpose()?
            .map(String::from),
        email: request
            .email
            .as_deref()
            .map(check_email)
            .transpose()?
            .map(String::from),
        password_hash: request
            .password
            .as_deref()
            .map(hash_checked_password)
            .transpose()?,
        role,
    };
    if update.is_empty() {
        return Err(AppError::BadRequest("No changes supplied".into()));
    }

    let record = repo
        .update(id, update)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    tracing::info!(id, by = %caller.username, "user updated");
    Ok(UserView::from(&record))
}

/// Axum handler for `GET /api/v1/users`.
pub async fn list_users_handler(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<UserView>>, AppError> {
    auth.require(Role::Admin)?;
    let users = state.users.list().await?;
    Ok(Json(users.iter().map(UserView::from).collect()))
}

/// Axum handler for `POST /api/v1/users`.
pub async fn create_user_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserView>), AppError> {
    auth.require(Role::Admin)?;
    let user = process_create_user(state.users.as_ref(), request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Axum handler for `GET /api/v1/users/{id}`.
pub async fn get_user_handler(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<UserView>, AppError> {
    check_account_access(&caller, id)?;
    let record = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(Json(UserView::from(&record)))
}

/// Axum handler for `PUT /api/v1/users/{id}`.
pub async fn update_user_handler(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserView>, AppError> {
    process_update_user(state.users.as_ref(), &caller, id, request)
        .await
        .map(Json)
}

/// Axum handler for `PUT /api/v1/auth/me`.
pub async fn update_self_handler(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserView>, AppError> {
    process_update_user(state.users.as_ref(), &caller, caller.user_id, request)
        .await
        .map(Json)
}

/// Axum handler for `DELETE /api/v1/users/{id}`.
///
/// Admins cannot delete their own account.
pub async fn delete_user_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let admin = auth.require(Role::Admin)?;
    if admin.user_id == id {
        return Err(AppError::BadRequest("Cannot delete your own account".into()));
    }
    if !state.users.delete(id).await? {
        return Err(AppError::NotFound(format!("User {id} not found")));
    }
    tracing::info!(id, by = %admin.username, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Axum handler for `POST /api/v1/users/delete-many`.
pub async fn delete_many_users_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<DeleteManyRequest>,
) -> Result<Json<DeletedCount>, AppError> {
    let admin = auth.require(Role::Admin)?;
    validate_ids(&request.ids)?;
    if request.ids.contains(&admin.user_id) {
        return Err(AppError::BadRequest("Cannot delete your own account".into()));
    }
    let deleted = state.users.delete_many(&request.ids).await?;
    tracing::info!(requested = request.ids.len(), deleted, by = %admin.username, "bulk user delete");
    Ok(Json(DeletedCount { deleted }))
}
