//! Reservation API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::models::{
    Reservation, ReservationCreate, ReservationQuery, ReservationStatusUpdate, ReservationUpdate,
};

use crate::core::ServerState;
use crate::services::ReservationService;
use crate::utils::AppResult;

const RESOURCE: &str = "reservation";

/// GET /api/reservations?table_id=&status=&from=&to=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ReservationQuery>,
) -> AppResult<Json<Vec<Reservation>>> {
    let reservations = ReservationService::new(state.pool.clone()).list(&query).await?;
    Ok(Json(reservations))
}

/// GET /api/reservations/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Reservation>> {
    Ok(Json(ReservationService::new(state.pool.clone()).get(id).await?))
}

/// POST /api/reservations
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ReservationCreate>,
) -> AppResult<(StatusCode, Json<Reservation>)> {
    let reservation = ReservationService::new(state.pool.clone()).create(payload).await?;
    state.broadcast_sync(RESOURCE, "created", reservation.id, Some(&reservation));
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// PUT /api/reservations/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ReservationUpdate>,
) -> AppResult<Json<Reservation>> {
    let reservation = ReservationService::new(state.pool.clone()).update(id, payload).await?;
    state.broadcast_sync(RESOURCE, "updated", id, Some(&reservation));
    Ok(Json(reservation))
}

/// PATCH /api/reservations/{id}/status
pub async fn change_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ReservationStatusUpdate>,
) -> AppResult<Json<Reservation>> {
    let reservation = ReservationService::new(state.pool.clone())
        .change_status(id, payload.status)
        .await?;
    state.broadcast_sync(RESOURCE, "updated", id, Some(&reservation));
    state.broadcast_sync::<()>("dining_table", "updated", reservation.table_id, None);
    Ok(Json(reservation))
}

/// DELETE /api/reservations/{id}
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    ReservationService::new(state.pool.clone()).delete(id).await?;
    state.broadcast_sync::<()>(RESOURCE, "deleted", id, None);
    Ok(StatusCode::NO_CONTENT)
}
