//! Content filter middleware: URLs containing a forbidden substring get a 404.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::FilterConfig;

pub async fn reject_forbidden(
    State(filter): State<Arc<FilterConfig>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    tracing::debug!(forbidden = %filter.forbidden, "Checking for forbidden content");

    let url = req.uri().to_string();
    if url.contains(filter.forbidden.as_str()) {
        tracing::info!(url = %url, "Rejected forbidden request");
        return (StatusCode::NOT_FOUND, filter.rejection_body()).into_response();
    }

    next.run(req).await
}
