//! Restaurant settings API
//!
//! Any authenticated user reads the settings (clients need the tax rate and
//! currency); only `settings:manage` may change them.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::permissions::SETTINGS_MANAGE;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let manage_routes = Router::new()
        .route("/api/settings", put(handler::update))
        .layer(middleware::from_fn(require_permission(SETTINGS_MANAGE)));

    Router::new()
        .route("/api/settings", get(handler::get))
        .merge(manage_routes)
}
