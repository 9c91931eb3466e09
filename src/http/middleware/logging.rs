//! Request logging middleware.

use std::net::SocketAddr;

use axum::{body::Body, extract::ConnectInfo, http::Request, middleware::Next, response::Response};

/// Log the remote address and URL before the inner handler runs, and the
/// outcome after it returns. The request and response pass through untouched.
pub async fn log_requests(req: Request<Body>, next: Next) -> Response {
    let remote_addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let url = req.uri().to_string();

    tracing::debug!(remote_addr = %remote_addr, url = %url, "Request received");
    let response = next.run(req).await;
    tracing::debug!(url = %url, status = %response.status(), "Request answered");

    response
}
