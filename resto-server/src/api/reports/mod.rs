//! Reports API
//!
//! | Path | Query | Permission |
//! |------|-------|------------|
//! | /api/reports/sales | from, to | reports:view |
//! | /api/reports/top-items | from, to, limit | reports:view |
//! | /api/reports/stock-alerts | | reports:view |
//! | /api/reports/orders-by-status | | reports:view |
//!
//! Dates are `YYYY-MM-DD` UTC days, both bounds inclusive, default today.

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::permissions::REPORTS_VIEW;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest(
        "/api/reports",
        Router::new()
            .route("/sales", get(handler::sales))
            .route("/top-items", get(handler::top_items))
            .route("/stock-alerts", get(handler::stock_alerts))
            .route("/orders-by-status", get(handler::orders_by_status))
            .layer(middleware::from_fn(require_permission(REPORTS_VIEW))),
    )
}
