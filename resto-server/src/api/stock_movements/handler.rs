//! Stock Movement API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{LedgerTotal, StockMovement, StockMovementCreate};

use crate::core::ServerState;
use crate::stock::StockService;
use crate::utils::AppResult;

/// POST /api/stock-movements
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<StockMovementCreate>,
) -> AppResult<(StatusCode, Json<StockMovement>)> {
    let movement = StockService::new(state.pool.clone(), state.notifier.clone())
        .apply_movement(payload)
        .await?;
    state.broadcast_sync("stock_movement", "created", movement.id, Some(&movement));
    Ok((StatusCode::CREATED, Json(movement)))
}

/// GET /api/stock-movements/ingredient/{id} - newest first
pub async fn list_for_ingredient(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let movements = StockService::new(state.pool.clone(), state.notifier.clone())
        .movements(id)
        .await?;
    Ok(Json(movements))
}

/// GET /api/stock-movements/ingredient/{id}/total
pub async fn ledger_total(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<LedgerTotal>> {
    let total = StockService::new(state.pool.clone(), state.notifier.clone())
        .ledger_total(id)
        .await?;
    Ok(Json(total))
}
