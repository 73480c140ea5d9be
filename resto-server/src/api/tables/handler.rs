//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate, TableStatus, TableStatusUpdate};

use crate::core::ServerState;
use crate::db::repository::{RepoError, dining_table, order, zone};
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode};

const RESOURCE: &str = "dining_table";

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::TableNotFound, format!("Table {id} not found"))
        .with_detail("table_id", id)
}

fn check_capacity(capacity: Option<i32>) -> AppResult<()> {
    match capacity {
        Some(c) if c <= 0 => Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "capacity must be positive",
        )
        .with_detail("field", "capacity")),
        _ => Ok(()),
    }
}

async fn check_zone(state: &ServerState, zone_id: i64) -> AppResult<()> {
    if zone::find_by_id(&state.pool, zone_id).await?.is_none() {
        return Err(AppError::with_message(ErrorCode::ZoneNotFound, format!("Zone {zone_id} not found")));
    }
    Ok(())
}

/// GET /api/tables
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<DiningTable>>> {
    Ok(Json(dining_table::find_all(&state.pool).await?))
}

/// GET /api/tables/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DiningTable>> {
    let table = dining_table::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(table))
}

/// POST /api/tables
pub async fn create(
    State(state): State<ServerState>,
    Json(mut payload): Json<DiningTableCreate>,
) -> AppResult<(StatusCode, Json<DiningTable>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    check_capacity(payload.capacity)?;
    check_zone(&state, payload.zone_id).await?;
    payload.name = payload.name.trim().to_string();

    let table = dining_table::create(&state.pool, payload)
        .await
        .map_err(|e| e.on_duplicate(ErrorCode::TableNameExists))?;
    state.broadcast_sync(RESOURCE, "created", table.id, Some(&table));
    Ok((StatusCode::CREATED, Json(table)))
}

/// PUT /api/tables/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<DiningTableUpdate>,
) -> AppResult<Json<DiningTable>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
        payload.name = Some(name.trim().to_string());
    }
    check_capacity(payload.capacity)?;
    if let Some(zone_id) = payload.zone_id {
        check_zone(&state, zone_id).await?;
    }

    dining_table::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let table = dining_table::update(&state.pool, id, payload)
        .await
        .map_err(|e| e.on_duplicate(ErrorCode::TableNameExists))?;
    state.broadcast_sync(RESOURCE, "updated", id, Some(&table));
    Ok(Json(table))
}

/// PATCH /api/tables/{id}/status
///
/// A table with open orders cannot be marked FREE.
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TableStatusUpdate>,
) -> AppResult<Json<DiningTable>> {
    dining_table::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if payload.status == TableStatus::Free {
        let mut conn = state.pool.acquire().await.map_err(RepoError::from)?;
        let open = order::count_open_on_table(&mut conn, id, 0).await?;
        if open > 0 {
            return Err(AppError::with_message(
                ErrorCode::TableOccupied,
                format!("Table {id} still has {open} open order(s)"),
            ));
        }
    }

    dining_table::update_status(&state.pool, id, payload.status).await?;
    let table = dining_table::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    state.broadcast_sync(RESOURCE, "updated", id, Some(&table));
    Ok(Json(table))
}

/// DELETE /api/tables/{id} - only tables with no order or reservation history
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    dining_table::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let orders = dining_table::count_orders(&state.pool, id).await?;
    let reservations = dining_table::count_reservations(&state.pool, id).await?;
    if orders + reservations > 0 {
        return Err(AppError::with_message(
            ErrorCode::TableHasOrders,
            format!("Table {id} is referenced by orders or reservations"),
        )
        .with_detail("order_count", orders)
        .with_detail("reservation_count", reservations));
    }

    dining_table::delete(&state.pool, id).await?;
    state.broadcast_sync::<()>(RESOURCE, "deleted", id, None);
    Ok(StatusCode::NO_CONTENT)
}
