//! Ingredient API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{
    Ingredient, IngredientCreate, IngredientUpdate, LedgerDrift, StockAlert, StockCorrection,
    StockMovement,
};

use crate::core::ServerState;
use crate::stock::StockService;
use crate::utils::AppResult;

const RESOURCE: &str = "ingredient";

fn service(state: &ServerState) -> StockService {
    StockService::new(state.pool.clone(), state.notifier.clone())
}

/// GET /api/ingredients
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Ingredient>>> {
    Ok(Json(service(&state).list_ingredients().await?))
}

/// GET /api/ingredients/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Ingredient>> {
    Ok(Json(service(&state).get_ingredient(id).await?))
}

/// GET /api/ingredients/alerts - at or below threshold
pub async fn alerts(State(state): State<ServerState>) -> AppResult<Json<Vec<StockAlert>>> {
    Ok(Json(service(&state).alerts().await?))
}

/// POST /api/ingredients
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<IngredientCreate>,
) -> AppResult<(StatusCode, Json<Ingredient>)> {
    let ingredient = service(&state).create_ingredient(payload).await?;
    state.broadcast_sync(RESOURCE, "created", ingredient.id, Some(&ingredient));
    Ok((StatusCode::CREATED, Json(ingredient)))
}

/// PUT /api/ingredients/{id} - name, unit, threshold (never quantity)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<IngredientUpdate>,
) -> AppResult<Json<Ingredient>> {
    let ingredient = service(&state).update_ingredient(id, payload).await?;
    state.broadcast_sync(RESOURCE, "updated", id, Some(&ingredient));
    Ok(Json(ingredient))
}

/// DELETE /api/ingredients/{id}
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    service(&state).delete_ingredient(id).await?;
    state.broadcast_sync::<()>(RESOURCE, "deleted", id, None);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/ingredients/{id}/correction
///
/// 201 with the adjusting movement, 200 with `null` when the count already matched.
pub async fn correct(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<StockCorrection>,
) -> AppResult<(StatusCode, Json<Option<StockMovement>>)> {
    let movement = service(&state).correct(id, payload).await?;
    match movement {
        Some(m) => {
            state.broadcast_sync("stock_movement", "created", m.id, Some(&m));
            Ok((StatusCode::CREATED, Json(Some(m))))
        }
        None => Ok((StatusCode::OK, Json(None))),
    }
}

/// POST /api/ingredients/reconcile - rebuild cached quantities from the ledger
pub async fn reconcile(State(state): State<ServerState>) -> AppResult<Json<Vec<LedgerDrift>>> {
    let drifts = service(&state).reconcile().await?;
    if !drifts.is_empty() {
        state.broadcast_sync::<()>(RESOURCE, "updated", "*", None);
    }
    Ok(Json(drifts))
}
