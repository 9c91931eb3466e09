//! Credential check middleware.
//!
//! A request passes when the username and the password are each found in
//! their header or their query parameter. Paths containing the bypass
//! substring (the favicon, by default) are never checked.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::CredentialConfig;
use crate::http::handlers::decoded_path;

pub const UNAUTHORIZED_BODY: &str = "You are not authorized to be here!";

/// Largest request body copied into the rejection log line.
const LOGGED_BODY_LIMIT: usize = 64 * 1024;

/// How long a rejection waits for the body before logging without it.
const LOGGED_BODY_WAIT: Duration = Duration::from_millis(100);

pub async fn require_credentials(
    State(creds): State<Arc<CredentialConfig>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if decoded_path(req.uri()).contains(creds.bypass_substring.as_str()) {
        return next.run(req).await;
    }

    tracing::debug!("Checking if user is authenticated");
    if is_authorized(&creds, req.headers(), req.uri().query()) {
        tracing::debug!("Authenticated successfully");
        return next.run(req).await;
    }

    let (parts, body) = req.into_parts();
    let body = body_for_log(body).await;
    tracing::warn!(
        headers = ?parts.headers,
        body = %body,
        url = %parts.uri,
        "Unauthorized request"
    );

    (StatusCode::UNAUTHORIZED, UNAUTHORIZED_BODY).into_response()
}

/// Body text for the rejection log. A body that is not complete within
/// [`LOGGED_BODY_WAIT`] is left unread so the 401 is not held up.
async fn body_for_log(body: Body) -> String {
    match tokio::time::timeout(LOGGED_BODY_WAIT, to_bytes(body, LOGGED_BODY_LIMIT)).await {
        Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
        Ok(Err(_)) => "<unreadable>".to_string(),
        Err(_) => "<incomplete>".to_string(),
    }
}

/// Each field may come from its header or its query parameter.
pub fn is_authorized(creds: &CredentialConfig, headers: &HeaderMap, query: Option<&str>) -> bool {
    field_matches(headers, query, &creds.username_header, &creds.username_query, &creds.username)
        && field_matches(headers, query, &creds.password_header, &creds.password_query, &creds.password)
}

fn field_matches(
    headers: &HeaderMap,
    query: Option<&str>,
    header: &str,
    key: &str,
    expected: &str,
) -> bool {
    let in_header = headers
        .get(header)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected);

    in_header || query_value(query, key).is_some_and(|value| value == expected)
}

/// First value of `key` in a URL query string, percent-decoded.
fn query_value(query: Option<&str>, key: &str) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
