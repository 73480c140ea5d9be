//! Zone API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{DiningTable, Zone, ZoneCreate, ZoneUpdate};

use crate::core::ServerState;
use crate::db::repository::{dining_table, zone};
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode};

const RESOURCE: &str = "zone";

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::ZoneNotFound, format!("Zone {id} not found"))
        .with_detail("zone_id", id)
}

/// GET /api/zones
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Zone>>> {
    Ok(Json(zone::find_all(&state.pool).await?))
}

/// GET /api/zones/{id}
pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<Zone>> {
    let found = zone::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(found))
}

/// GET /api/zones/{id}/tables
pub async fn list_tables(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<DiningTable>>> {
    zone::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(dining_table::find_by_zone(&state.pool, id).await?))
}

/// POST /api/zones
pub async fn create(
    State(state): State<ServerState>,
    Json(mut payload): Json<ZoneCreate>,
) -> AppResult<(StatusCode, Json<Zone>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    payload.name = payload.name.trim().to_string();

    let created = zone::create(&state.pool, payload)
        .await
        .map_err(|e| e.on_duplicate(ErrorCode::ZoneNameExists))?;
    state.broadcast_sync(RESOURCE, "created", created.id, Some(&created));
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/zones/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<ZoneUpdate>,
) -> AppResult<Json<Zone>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
        payload.name = Some(name.trim().to_string());
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    zone::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let updated = zone::update(&state.pool, id, payload)
        .await
        .map_err(|e| e.on_duplicate(ErrorCode::ZoneNameExists))?;
    state.broadcast_sync(RESOURCE, "updated", id, Some(&updated));
    Ok(Json(updated))
}

/// DELETE /api/zones/{id} - only when empty
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    zone::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let tables = zone::count_tables(&state.pool, id).await?;
    if tables > 0 {
        return Err(AppError::new(ErrorCode::ZoneHasTables).with_detail("table_count", tables));
    }

    zone::delete(&state.pool, id).await?;
    state.broadcast_sync::<()>(RESOURCE, "deleted", id, None);
    Ok(StatusCode::NO_CONTENT)
}
