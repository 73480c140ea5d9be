//! Router assembly
//!
//! [`build_router`] registers every API router; [`build_app`] adds the
//! middleware stack and is shared by the HTTP server and the integration
//! tests (which drive it with `tower::ServiceExt::oneshot`).

mod logging;

use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue, StatusCode};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::api;
use crate::auth::require_auth;
use crate::core::ServerState;

pub use logging::logging_middleware;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// UUID v4 request ids
#[derive(Clone, Copy, Default)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Slow requests are answered with 408
fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// Every route, no middleware
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Public
        .merge(api::health::router())
        .merge(api::auth::router())
        // Orders and payments
        .merge(api::orders::router())
        .merge(api::payments::router())
        // Stock
        .merge(api::ingredients::router())
        .merge(api::stock_movements::router())
        // Menu
        .merge(api::categories::router())
        .merge(api::menu_items::router())
        .merge(api::promotions::router())
        // Floor
        .merge(api::zones::router())
        .merge(api::tables::router())
        .merge(api::reservations::router())
        // Administration
        .merge(api::users::router())
        .merge(api::reports::router())
        .merge(api::settings::router())
}

/// Routes plus the middleware stack, state applied
///
/// Outermost first: request id, CORS, tracing, timeout, request log,
/// authentication. Permission checks sit on the individual routers.
pub fn build_app(state: &ServerState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let timeout = Duration::from_millis(state.config.request_timeout_ms);

    build_router()
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(timeout_layer(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, XRequestId))
        .with_state(state.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::routing::get;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_slow_request_times_out_with_408() {
        let app: Router = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    "done"
                }),
            )
            .route("/fast", get(|| async { "done" }))
            .layer(timeout_layer(Duration::from_millis(20)));

        let slow = http::Request::get("/slow").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(slow).await.unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

        let fast = http::Request::get("/fast").body(Body::empty()).unwrap();
        let response = app.oneshot(fast).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
