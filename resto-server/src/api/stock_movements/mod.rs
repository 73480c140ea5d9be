//! Stock movement API
//!
//! | Path | Method | Permission |
//! |------|--------|------------|
//! | /api/stock-movements | POST | stock:manage |
//! | /api/stock-movements/ingredient/{id} | GET | stock:read |
//! | /api/stock-movements/ingredient/{id}/total | GET | stock:read |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::permissions::{STOCK_MANAGE, STOCK_READ};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/ingredient/{id}", get(handler::list_for_ingredient))
        .route("/ingredient/{id}/total", get(handler::ledger_total))
        .layer(middleware::from_fn(require_permission(STOCK_READ)));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_permission(STOCK_MANAGE)));

    Router::new().nest("/api/stock-movements", read_routes.merge(manage_routes))
}
