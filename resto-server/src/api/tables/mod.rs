//! Dining table API
//!
//! Waiters read tables and flip their status; the floor plan itself
//! (create, rename, move, delete) is manager work.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post, put},
};

use crate::auth::permissions::{TABLES_MANAGE, TABLES_READ, TABLES_STATUS};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_permission(TABLES_READ)));

    let status_routes = Router::new()
        .route("/{id}/status", patch(handler::update_status))
        .layer(middleware::from_fn(require_permission(TABLES_STATUS)));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .layer(middleware::from_fn(require_permission(TABLES_MANAGE)));

    read_routes.merge(status_routes).merge(manage_routes)
}
