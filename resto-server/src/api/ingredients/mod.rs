//! Ingredient API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::permissions::{STOCK_MANAGE, STOCK_READ};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/ingredients", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/alerts", get(handler::alerts))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_permission(STOCK_READ)));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/reconcile", post(handler::reconcile))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/correction", post(handler::correct))
        .layer(middleware::from_fn(require_permission(STOCK_MANAGE)));

    read_routes.merge(manage_routes)
}
