//! Request log middleware

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Log one line per request with method, matched route, status and latency
///
/// 5xx at WARN, 4xx at INFO, the rest at DEBUG.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();

    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let response = next.run(req).await;

    let latency_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    if response.status().is_server_error() {
        warn!(%request_id, %method, %path, status, latency_ms, "Request failed");
    } else if response.status().is_client_error() {
        info!(%request_id, %method, %path, status, latency_ms, "Request rejected");
    } else {
        debug!(%request_id, %method, %path, status, latency_ms, "Request completed");
    }

    response
}
