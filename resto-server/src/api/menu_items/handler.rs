//! Menu Item API Handlers
//!
//! Price changes never touch existing order lines: lines keep the unit
//! price captured when they were added.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::models::{MenuItem, MenuItemCreate, MenuItemQuery, MenuItemUpdate};

use crate::core::ServerState;
use crate::db::repository::{category, menu_item};
use crate::orders::money;
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode};

const RESOURCE: &str = "menu_item";

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::MenuItemNotFound, format!("Menu item {id} not found"))
        .with_detail("menu_item_id", id)
}

fn check_price(price: f64) -> AppResult<()> {
    money::validate_price(price)
        .map_err(|e| AppError::with_message(ErrorCode::MenuItemInvalidPrice, e.to_string()))
}

async fn check_category(state: &ServerState, category_id: i64) -> AppResult<()> {
    if category::find_by_id(&state.pool, category_id).await?.is_none() {
        return Err(AppError::with_message(
            ErrorCode::CategoryNotFound,
            format!("Category {category_id} not found"),
        )
        .with_detail("category_id", category_id));
    }
    Ok(())
}

/// GET /api/menu-items?category_id=&available=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<MenuItemQuery>,
) -> AppResult<Json<Vec<MenuItem>>> {
    Ok(Json(menu_item::find_all(&state.pool, &query).await?))
}

/// GET /api/menu-items/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MenuItem>> {
    let item = menu_item::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(item))
}

/// POST /api/menu-items
pub async fn create(
    State(state): State<ServerState>,
    Json(mut payload): Json<MenuItemCreate>,
) -> AppResult<(StatusCode, Json<MenuItem>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    check_price(payload.price)?;
    check_category(&state, payload.category_id).await?;
    payload.name = payload.name.trim().to_string();

    let item = menu_item::create(&state.pool, payload)
        .await
        .map_err(|e| e.on_duplicate(ErrorCode::MenuItemNameExists))?;
    state.broadcast_sync(RESOURCE, "created", item.id, Some(&item));
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/menu-items/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<MenuItemUpdate>,
) -> AppResult<Json<MenuItem>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
        payload.name = Some(name.trim().to_string());
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    if let Some(price) = payload.price {
        check_price(price)?;
    }
    if let Some(category_id) = payload.category_id {
        check_category(&state, category_id).await?;
    }

    menu_item::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let item = menu_item::update(&state.pool, id, payload)
        .await
        .map_err(|e| e.on_duplicate(ErrorCode::MenuItemNameExists))?;
    state.broadcast_sync(RESOURCE, "updated", id, Some(&item));
    Ok(Json(item))
}

/// DELETE /api/menu-items/{id}
///
/// Items referenced by order lines stay; mark them unavailable instead.
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    menu_item::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let lines = menu_item::count_order_lines(&state.pool, id).await?;
    if lines > 0 {
        return Err(AppError::with_message(
            ErrorCode::MenuItemInUse,
            format!("Menu item {id} appears on {lines} order line(s)"),
        ));
    }

    menu_item::delete(&state.pool, id).await?;
    state.broadcast_sync::<()>(RESOURCE, "deleted", id, None);
    Ok(StatusCode::NO_CONTENT)
}
