//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with handlers and middleware
//! - Serve HTTP/1.1 and HTTP/2 connections with read, write and idle timeouts
//! - Stop accepting on shutdown, disable keep-alive, drain in-flight requests

use axum::{extract::ConnectInfo, http::Request, Router};
use hyper::{body::Incoming, service::service_fn};
use hyper_util::{
    rt::{TokioExecutor, TokioIo, TokioTimer},
    server::conn::auto,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::task::JoinSet;
use tower::ServiceExt;

use crate::config::{ServerConfig, TimeoutConfig};
use crate::http::{handlers, middleware};
use crate::lifecycle::{Lifecycle, LifecycleState, Shutdown, ShutdownSignal};
use crate::net::listener::ConnectionPermit;
use crate::net::{
    AcceptBackoff, ConnectionActivity, ConnectionId, ConnectionState, Listener, ListenerError,
};

/// Fatal server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not gracefully shutdown the server: {in_flight} connection(s) still open after {timeout:?}")]
    ShutdownTimeout { timeout: Duration, in_flight: usize },
}

/// HTTP server for the hello service.
pub struct HttpServer {
    router: Router,
    config: Arc<ServerConfig>,
    lifecycle: Lifecycle,
}

impl HttpServer {
    /// Create a new HTTP server serving the default routes.
    pub fn new(config: ServerConfig) -> Self {
        let routes = handlers::routes(&config);
        Self::with_routes(config, routes)
    }

    /// Create a server whose handler chain wraps `routes` instead of the defaults.
    pub fn with_routes(config: ServerConfig, routes: Router) -> Self {
        let router = Self::build_router(&config, routes);
        Self {
            router,
            config: Arc::new(config),
            lifecycle: Lifecycle::new(),
        }
    }

    /// Compose logging → write timeout → guard → routes.
    fn build_router(config: &ServerConfig, routes: Router) -> Router {
        middleware::apply(routes, &config.guard, config.timeouts.write())
    }

    /// Run the server until `shutdown` fires and every connection has drained.
    pub async fn run(self, listener: Listener, shutdown: Shutdown) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        let builder = connection_builder(&self.config.timeouts);
        let idle_timeout = self.config.timeouts.idle();
        let mut signal = shutdown.subscribe();
        let mut connections = JoinSet::new();
        let mut backoff = AcceptBackoff::default();

        self.advance(LifecycleState::Listening);
        tracing::info!(address = %addr, "Server is ready to handle requests");

        loop {
            tokio::select! {
                _ = signal.recv() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer, permit)) => {
                        backoff.reset();
                        connections.spawn(serve_connection(
                            builder.clone(),
                            stream,
                            peer,
                            self.router.clone(),
                            idle_timeout,
                            shutdown.subscribe(),
                            permit,
                        ));
                    }
                    Err(e) if e.is_connection_error() => {
                        tracing::debug!(error = %e, "Connection dropped before accept");
                    }
                    Err(e) => {
                        let delay = backoff.next_delay();
                        tracing::warn!(error = %e, retry_in = ?delay, "Failed to accept connection");
                        tokio::time::sleep(delay).await;
                    }
                },
                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = joined {
                        tracing::warn!(error = %e, "Connection task failed");
                    }
                }
            }
        }

        // Refuse new connections from here on.
        drop(listener);
        self.advance(LifecycleState::ShuttingDown);

        let timeout = self.config.timeouts.shutdown();
        tracing::info!(
            open_connections = connections.len(),
            timeout = ?timeout,
            "Draining connections"
        );

        let drained = tokio::time::timeout(timeout, async {
            while connections.join_next().await.is_some() {}
        })
        .await;

        let result = match drained {
            Ok(()) => Ok(()),
            Err(_) => {
                let in_flight = connections.len();
                connections.abort_all();
                Err(ServerError::ShutdownTimeout { timeout, in_flight })
            }
        };

        self.advance(LifecycleState::Stopped);
        result
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Handle for observing the server's lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.clone()
    }

    fn advance(&self, next: LifecycleState) {
        if let Err(e) = self.lifecycle.advance(next) {
            tracing::warn!(error = %e, "Unexpected lifecycle state");
        }
    }
}

/// Connection settings shared by every accepted socket.
fn connection_builder(timeouts: &TimeoutConfig) -> auto::Builder<TokioExecutor> {
    let mut builder = auto::Builder::new(TokioExecutor::new());
    builder
        .http1()
        .timer(TokioTimer::new())
        .header_read_timeout(timeouts.read())
        .keep_alive(true);
    builder.http2().timer(TokioTimer::new());
    builder
}

/// Serve one connection until the client leaves, it idles out, or shutdown drains it.
async fn serve_connection(
    builder: auto::Builder<TokioExecutor>,
    stream: TcpStream,
    peer: SocketAddr,
    router: Router,
    idle_timeout: Duration,
    mut shutdown: ShutdownSignal,
    _permit: ConnectionPermit,
) {
    let id = ConnectionId::new();
    let activity = Arc::new(ConnectionActivity::new());

    let service = {
        let activity = Arc::clone(&activity);
        service_fn(move |mut req: Request<Incoming>| {
            req.extensions_mut().insert(ConnectInfo(peer));
            let guard = activity.begin();
            let router = router.clone();
            async move {
                let response = router.oneshot(req).await;
                drop(guard);
                response
            }
        })
    };

    let conn = builder.serve_connection(TokioIo::new(stream), service);
    tokio::pin!(conn);

    let mut state = ConnectionState::Active;
    tracing::trace!(connection_id = %id, peer_addr = %peer, "Connection opened");

    loop {
        tokio::select! {
            result = conn.as_mut() => {
                if let Err(e) = result {
                    tracing::debug!(connection_id = %id, error = %e, "Connection error");
                }
                break;
            }
            _ = shutdown.recv(), if state == ConnectionState::Active => {
                conn.as_mut().graceful_shutdown();
                state = ConnectionState::Draining;
                tracing::trace!(
                    connection_id = %id,
                    in_flight = activity.in_flight(),
                    "Connection draining"
                );
            }
            _ = tokio::time::sleep_until(activity.idle_deadline(idle_timeout)), if state == ConnectionState::Active => {
                if activity.is_idle(idle_timeout) {
                    conn.as_mut().graceful_shutdown();
                    state = ConnectionState::Draining;
                    tracing::trace!(connection_id = %id, "Idle connection closing");
                }
            }
        }
    }

    state = ConnectionState::Closed;
    tracing::trace!(connection_id = %id, state = ?state, "Connection closed");
}
