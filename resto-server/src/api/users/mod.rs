//! User API (manager only)

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::permissions::USERS_MANAGE;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest(
        "/api/users",
        Router::new()
            .route("/", get(handler::list).post(handler::create))
            .route(
                "/{id}",
                get(handler::get_by_id)
                    .put(handler::update)
                    .delete(handler::delete),
            )
            .layer(middleware::from_fn(require_permission(USERS_MANAGE))),
    )
}
