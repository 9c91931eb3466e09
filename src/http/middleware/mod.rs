//! Request middleware.
//!
//! # Data Flow
//! ```text
//! request
//!     → logging.rs (received line)
//!     → write timeout (408)
//!     → credentials.rs | content_filter.rs (guard, per GuardMode)
//!     → handler
//!     → logging.rs (answered line)
//! ```

pub mod content_filter;
pub mod credentials;
pub mod logging;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    Router,
};
use tower_http::timeout::TimeoutLayer;

use crate::config::{GuardConfig, GuardMode};

/// Wrap `routes` in the configured guard, the write timeout, then request logging.
///
/// Logging sits outside the timeout so a timed-out request is still answered in the log.
#[allow(deprecated)]
pub fn apply(routes: Router, guard: &GuardConfig, write_timeout: Duration) -> Router {
    let guarded = match guard.mode {
        GuardMode::Credentials => routes.layer(from_fn_with_state(
            Arc::new(guard.credentials.clone()),
            credentials::require_credentials,
        )),
        GuardMode::Filter => routes.layer(from_fn_with_state(
            Arc::new(guard.filter.clone()),
            content_filter::reject_forbidden,
        )),
        GuardMode::None => routes,
    };

    guarded
        .layer(TimeoutLayer::new(write_timeout))
        .layer(from_fn(logging::log_requests))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ObservabilityConfig;
    use crate::observability::logging::{capture::CapturedLogs, subscriber};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::any,
    };
    use tower::ServiceExt;

    fn capture() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
        let logs = CapturedLogs::default();
        let config = ObservabilityConfig {
            ansi: false,
            ..Default::default()
        };
        let guard = tracing::subscriber::set_default(subscriber(&config, logs.clone()));
        (logs, guard)
    }

    fn position(lines: &[String], needle: &str) -> usize {
        lines
            .iter()
            .position(|l| l.contains(needle))
            .unwrap_or_else(|| panic!("{needle:?} not logged: {lines:#?}"))
    }

    fn routes() -> Router {
        Router::new()
            .route("/{*path}", any(|| async { "inner" }))
            .route(
                "/slow",
                any(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "too late"
                }),
            )
    }

    async fn status(app: Router, uri: &str) -> StatusCode {
        app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    fn guard(mode: GuardMode) -> GuardConfig {
        GuardConfig {
            mode,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn credential_rejection_is_logged_as_answered() {
        let (logs, _guard) = capture();
        let app = apply(routes(), &guard(GuardMode::Credentials), Duration::from_secs(10));
        assert_eq!(status(app, "/hello").await, StatusCode::UNAUTHORIZED);

        let lines = logs.lines();
        let received = position(&lines, "Request received");
        let rejected = position(&lines, "Unauthorized request");
        let answered = position(&lines, "Request answered");
        assert!(received < rejected && rejected < answered);
        assert!(lines[answered].contains("401"));
    }

    #[tokio::test]
    async fn filter_rejection_is_logged_as_answered() {
        let (logs, _guard) = capture();
        let app = apply(routes(), &guard(GuardMode::Filter), Duration::from_secs(10));
        assert_eq!(status(app, "/pron").await, StatusCode::NOT_FOUND);

        let lines = logs.lines();
        let received = position(&lines, "Request received");
        let rejected = position(&lines, "Rejected forbidden request");
        let answered = position(&lines, "Request answered");
        assert!(received < rejected && rejected < answered);
        assert!(lines[answered].contains("404"));
    }

    #[tokio::test]
    async fn write_timeout_is_logged_as_answered() {
        let (logs, _guard) = capture();
        let app = apply(routes(), &guard(GuardMode::None), Duration::from_millis(50));
        assert_eq!(status(app, "/slow").await, StatusCode::REQUEST_TIMEOUT);

        let lines = logs.lines();
        let received = position(&lines, "Request received");
        let answered = position(&lines, "Request answered");
        assert!(received < answered);
        assert!(lines[answered].contains("408"));
    }

    #[tokio::test]
    async fn no_guard_delegates() {
        let app = apply(routes(), &guard(GuardMode::None), Duration::from_secs(10));
        assert_eq!(status(app, "/hello").await, StatusCode::OK);
    }
}
