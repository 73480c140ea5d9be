//! Order API
//!
//! | Path | Method | Permission |
//! |------|--------|------------|
//! | /api/orders | GET | orders:read |
//! | /api/orders/{id} | GET | orders:read |
//! | /api/orders | POST | orders:manage |
//! | /api/orders/{id} | PUT | orders:manage |
//! | /api/orders/{id}/lines[/{line_id}] | POST/PUT/DELETE | orders:manage |
//! | /api/orders/{id}/promotion | POST/DELETE | orders:manage |
//! | /api/orders/{id}/status | PATCH | orders:status |
//! | /api/orders/{id} | DELETE | orders:delete |

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post, put},
};

use crate::auth::permissions::{ORDERS_DELETE, ORDERS_MANAGE, ORDERS_READ, ORDERS_STATUS};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_permission(ORDERS_READ)));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update))
        .route("/{id}/lines", post(handler::add_line))
        .route(
            "/{id}/lines/{line_id}",
            put(handler::update_line).delete(handler::remove_line),
        )
        .route(
            "/{id}/promotion",
            post(handler::apply_promotion).delete(handler::remove_promotion),
        )
        .layer(middleware::from_fn(require_permission(ORDERS_MANAGE)));

    let status_routes = Router::new()
        .route("/{id}/status", patch(handler::change_status))
        .layer(middleware::from_fn(require_permission(ORDERS_STATUS)));

    let delete_routes = Router::new()
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_permission(ORDERS_DELETE)));

    read_routes
        .merge(manage_routes)
        .merge(status_routes)
        .merge(delete_routes)
}
