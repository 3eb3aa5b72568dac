use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::middleware::request_id::RequestId;

/// Logs method, URI, status, latency and request id for every 4xx and 5xx
/// response. Bodies are passed through untouched.
pub async fn log_error_responses(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let uri = req.uri().to_string();
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let start = Instant::now();

    let response = next.run(req).await;
    let status = response.status();
    let latency_ms = start.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(
            status = status.as_u16(),
            method = %method,
            uri = %uri,
            latency_ms,
            request_id = %request_id,
            "Request completed with error status"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            status = status.as_u16(),
            method = %method,
            uri = %uri,
            latency_ms,
            request_id = %request_id,
            "Request completed with error status"
        );
    }

    response
}
