//! Auth API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/auth/login | POST | public |
//! | /api/auth/me | GET | token |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest(
        "/api/auth",
        Router::new()
            .route("/login", post(handler::login))
            .route("/me", get(handler::me)),
    )
}
