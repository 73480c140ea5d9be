//! Payment API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{Payment, PaymentCreate, PaymentSettle};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::orders::payment::PaymentService;
use crate::utils::AppResult;

const RESOURCE: &str = "payment";

fn service(state: &ServerState) -> PaymentService {
    PaymentService::new(state.pool.clone(), state.notifier.clone())
}

/// GET /api/payments
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Payment>>> {
    Ok(Json(service(&state).list().await?))
}

/// GET /api/payments/commande/{order_id}
pub async fn get_by_order(
    State(state): State<ServerState>,
    Path(order_id): Path<i64>,
) -> AppResult<Json<Payment>> {
    Ok(Json(service(&state).find_by_order(order_id).await?))
}

/// POST /api/payments - explicit amount
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PaymentCreate>,
) -> AppResult<(StatusCode, Json<Payment>)> {
    let payment = service(&state).record_payment(payload).await?;
    state.broadcast_sync(RESOURCE, "created", payment.id, Some(&payment));
    Ok((StatusCode::CREATED, Json(payment)))
}

/// POST /api/payments/effectuer - pay the order's current total
pub async fn settle(
    State(state): State<ServerState>,
    Json(payload): Json<PaymentSettle>,
) -> AppResult<(StatusCode, Json<Payment>)> {
    let payment = service(&state).settle(payload).await?;
    state.broadcast_sync(RESOURCE, "created", payment.id, Some(&payment));
    Ok((StatusCode::CREATED, Json(payment)))
}

/// DELETE /api/payments/{id} - order goes back to PENDING
pub async fn delete(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    service(&state).delete_payment(id).await?;
    tracing::warn!(payment_id = id, user_id = current_user.id, "Payment removed by manager");
    state.broadcast_sync::<()>(RESOURCE, "deleted", id, None);
    Ok(StatusCode::NO_CONTENT)
}
