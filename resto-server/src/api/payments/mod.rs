//! Payment API

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::auth::permissions::{PAYMENTS_DELETE, PAYMENTS_MANAGE, PAYMENTS_READ};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/commande/{order_id}", get(handler::get_by_order))
        .layer(middleware::from_fn(require_permission(PAYMENTS_READ)));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/effectuer", post(handler::settle))
        .layer(middleware::from_fn(require_permission(PAYMENTS_MANAGE)));

    let delete_routes = Router::new()
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_permission(PAYMENTS_DELETE)));

    read_routes.merge(manage_routes).merge(delete_routes)
}
