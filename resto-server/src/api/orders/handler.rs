//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::models::{
    Order, OrderCreate, OrderDetail, OrderLineInput, OrderLineUpdate, OrderPromotionInput,
    OrderQuery, OrderStatusUpdate, OrderUpdate,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::orders::service::OrderService;
use crate::utils::AppResult;

const RESOURCE: &str = "order";

fn service(state: &ServerState) -> OrderService {
    OrderService::new(state.pool.clone(), state.notifier.clone())
}

/// GET /api/orders?status=&table_id=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<OrderQuery>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(service(&state).list(&query).await?))
}

/// GET /api/orders/{id} - order with its lines
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    Ok(Json(service(&state).get(id).await?))
}

/// POST /api/orders
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<OrderDetail>)> {
    let detail = service(&state).create(current_user.id, payload).await?;
    state.broadcast_sync(RESOURCE, "created", detail.order.id, Some(&detail.order));
    Ok((StatusCode::CREATED, Json(detail)))
}

/// PUT /api/orders/{id} - type, table, notes
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderUpdate>,
) -> AppResult<Json<Order>> {
    let order = service(&state).update(id, payload).await?;
    state.broadcast_sync(RESOURCE, "updated", id, Some(&order));
    Ok(Json(order))
}

/// DELETE /api/orders/{id}
pub async fn delete(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    service(&state).delete(id).await?;
    tracing::info!(order_id = id, user_id = current_user.id, "Order deleted");
    state.broadcast_sync::<()>(RESOURCE, "deleted", id, None);
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/orders/{id}/status
pub async fn change_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<Order>> {
    let order = service(&state).change_status(id, payload.status).await?;
    state.broadcast_sync(RESOURCE, "updated", id, Some(&order));
    Ok(Json(order))
}

/// POST /api/orders/{id}/lines
pub async fn add_line(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderLineInput>,
) -> AppResult<(StatusCode, Json<OrderDetail>)> {
    let detail = service(&state).add_line(id, payload).await?;
    state.broadcast_sync(RESOURCE, "updated", id, Some(&detail.order));
    Ok((StatusCode::CREATED, Json(detail)))
}

/// PUT /api/orders/{id}/lines/{line_id}
pub async fn update_line(
    State(state): State<ServerState>,
    Path((id, line_id)): Path<(i64, i64)>,
    Json(payload): Json<OrderLineUpdate>,
) -> AppResult<Json<OrderDetail>> {
    let detail = service(&state).update_line(id, line_id, payload).await?;
    state.broadcast_sync(RESOURCE, "updated", id, Some(&detail.order));
    Ok(Json(detail))
}

/// DELETE /api/orders/{id}/lines/{line_id}
pub async fn remove_line(
    State(state): State<ServerState>,
    Path((id, line_id)): Path<(i64, i64)>,
) -> AppResult<Json<OrderDetail>> {
    let detail = service(&state).remove_line(id, line_id).await?;
    state.broadcast_sync(RESOURCE, "updated", id, Some(&detail.order));
    Ok(Json(detail))
}

/// POST /api/orders/{id}/promotion
pub async fn apply_promotion(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderPromotionInput>,
) -> AppResult<Json<OrderDetail>> {
    let detail = service(&state).apply_promotion(id, &payload.code).await?;
    state.broadcast_sync(RESOURCE, "updated", id, Some(&detail.order));
    Ok(Json(detail))
}

/// DELETE /api/orders/{id}/promotion
pub async fn remove_promotion(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let detail = service(&state).remove_promotion(id).await?;
    state.broadcast_sync(RESOURCE, "updated", id, Some(&detail.order));
    Ok(Json(detail))
}
