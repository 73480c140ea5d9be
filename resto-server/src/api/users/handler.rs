//! User API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{User, UserCreate, UserUpdate};

use crate::auth::CurrentUser;
use crate::auth::password::hash_password;
use crate::core::ServerState;
use crate::db::repository::user::{self, NewUser, UserChanges};
use crate::security_log;
use crate::utils::validation::{MAX_NAME_LEN, validate_password, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode};

const RESOURCE: &str = "user";

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::UserNotFound, format!("User {id} not found"))
        .with_detail("user_id", id)
}

fn hash(password: &str) -> AppResult<String> {
    validate_password(password)?;
    hash_password(password).map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

/// GET /api/users
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(user::find_all(&state.pool).await?))
}

/// GET /api/users/{id}
pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<User>> {
    let found = user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(found))
}

/// POST /api/users
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<UserCreate>,
) -> AppResult<(StatusCode, Json<User>)> {
    validate_required_text(&payload.username, "username", MAX_NAME_LEN)?;
    let username = payload.username.trim().to_string();
    let display_name = payload
        .display_name
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| username.clone());
    validate_required_text(&display_name, "display_name", MAX_NAME_LEN)?;

    let created = user::create(
        &state.pool,
        NewUser {
            username,
            display_name,
            hash_pass: hash(&payload.password)?,
            role: payload.role,
        },
    )
    .await
    .map_err(|e| e.on_duplicate(ErrorCode::UsernameExists))?;

    security_log!(
        "INFO",
        "user_created",
        user_id = created.id,
        username = created.username.as_str(),
        role = created.role.as_str(),
        by = current_user.id
    );
    state.broadcast_sync(RESOURCE, "created", created.id, Some(&created));
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/users/{id}
///
/// A manager cannot deactivate or demote their own account.
pub async fn update(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<User>> {
    let existing = user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if id == current_user.id
        && (payload.is_active == Some(false) || payload.role.is_some_and(|r| r != existing.role))
    {
        return Err(AppError::with_message(
            ErrorCode::UserCannotModifySelf,
            "You cannot deactivate or change the role of your own account",
        ));
    }

    let mut changes = UserChanges {
        role: payload.role,
        is_active: payload.is_active,
        ..Default::default()
    };
    if let Some(username) = payload.username {
        validate_required_text(&username, "username", MAX_NAME_LEN)?;
        changes.username = Some(username.trim().to_string());
    }
    if let Some(display_name) = payload.display_name {
        validate_required_text(&display_name, "display_name", MAX_NAME_LEN)?;
        changes.display_name = Some(display_name.trim().to_string());
    }
    if let Some(password) = payload.password {
        changes.hash_pass = Some(hash(&password)?);
    }
    let password_changed = changes.hash_pass.is_some();

    let updated = user::update(&state.pool, id, changes)
        .await
        .map_err(|e| e.on_duplicate(ErrorCode::UsernameExists))?;

    if password_changed || updated.role != existing.role || updated.is_active != existing.is_active {
        security_log!(
            "INFO",
            "user_updated",
            user_id = id,
            by = current_user.id,
            password_changed = password_changed,
            role = updated.role.as_str(),
            is_active = updated.is_active
        );
    }
    state.broadcast_sync(RESOURCE, "updated", id, Some(&updated));
    Ok(Json(updated))
}

/// DELETE /api/users/{id}
///
/// Users who opened orders keep their row for history; deactivate them instead.
pub async fn delete(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if id == current_user.id {
        return Err(AppError::with_message(
            ErrorCode::UserCannotModifySelf,
            "You cannot delete your own account",
        ));
    }
    user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let orders = user::count_orders(&state.pool, id).await?;
    if orders > 0 {
        return Err(AppError::with_message(
            ErrorCode::InvalidRequest,
            format!("User {id} has {orders} order(s); deactivate the account instead"),
        ));
    }

    user::delete(&state.pool, id).await?;
    security_log!("WARN", "user_deleted", user_id = id, by = current_user.id);
    state.broadcast_sync::<()>(RESOURCE, "deleted", id, None);
    Ok(StatusCode::NO_CONTENT)
}
