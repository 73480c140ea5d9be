//! Category API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{Category, CategoryCreate, CategoryUpdate};

use crate::core::ServerState;
use crate::db::repository::category;
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode};

const RESOURCE: &str = "category";

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::CategoryNotFound, format!("Category {id} not found"))
        .with_detail("category_id", id)
}

/// GET /api/categories - by sort order
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(category::find_all(&state.pool).await?))
}

/// GET /api/categories/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Category>> {
    let found = category::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(found))
}

/// POST /api/categories
pub async fn create(
    State(state): State<ServerState>,
    Json(mut payload): Json<CategoryCreate>,
) -> AppResult<(StatusCode, Json<Category>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    payload.name = payload.name.trim().to_string();

    let created = category::create(&state.pool, payload)
        .await
        .map_err(|e| e.on_duplicate(ErrorCode::CategoryNameExists))?;
    state.broadcast_sync(RESOURCE, "created", created.id, Some(&created));
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/categories/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<CategoryUpdate>,
) -> AppResult<Json<Category>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
        payload.name = Some(name.trim().to_string());
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    category::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let updated = category::update(&state.pool, id, payload)
        .await
        .map_err(|e| e.on_duplicate(ErrorCode::CategoryNameExists))?;
    state.broadcast_sync(RESOURCE, "updated", id, Some(&updated));
    Ok(Json(updated))
}

/// DELETE /api/categories/{id} - refused while items still belong to it
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    category::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let items = category::count_items(&state.pool, id).await?;
    if items > 0 {
        return Err(AppError::with_message(
            ErrorCode::CategoryHasItems,
            format!("Category {id} still has {items} menu item(s)"),
        )
        .with_detail("item_count", items));
    }

    category::delete(&state.pool, id).await?;
    state.broadcast_sync::<()>(RESOURCE, "deleted", id, None);
    Ok(StatusCode::NO_CONTENT)
}
