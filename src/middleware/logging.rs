use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::time::Instant;

/// Log each request with the client address, status and latency
pub async fn log_request(request: Request, next: Next) -> Response {
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    tracing::debug!(
        client_ip = %client_ip,
        method = %method,
        uri = %uri,
        "Incoming request"
    );

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(
            client_ip = %client_ip,
            method = %method,
            uri = %uri,
            status = %status,
            elapsed_ms,
            "Request failed"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            client_ip = %client_ip,
            method = %method,
            uri = %uri,
            status = %status,
            elapsed_ms,
            "Request rejected"
        );
    } else {
        tracing::debug!(
            client_ip = %client_ip,
            method = %method,
            uri = %uri,
            status = %status,
            elapsed_ms,
            "Request completed"
        );
    }

    response
}
