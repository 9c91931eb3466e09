//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use hello_server::config::{GuardMode, ServerConfig};
use hello_server::http::{HttpServer, ServerError};
use hello_server::lifecycle::{Lifecycle, LifecycleState};
use hello_server::net::Listener;
use hello_server::Shutdown;
use tokio::task::JoinHandle;

/// A server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub lifecycle: Lifecycle,
    pub handle: JoinHandle<Result<(), ServerError>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for `run` to return.
    #[allow(dead_code)]
    pub async fn stop(self) -> Result<(), ServerError> {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(10), self.handle)
            .await
            .expect("server did not stop")
            .expect("server task panicked")
    }
}

pub fn config(mode: GuardMode) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.host = "127.0.0.1".to_string();
    config.listener.port = 0;
    config.guard.mode = mode;
    config
}

#[allow(dead_code)]
pub async fn start(config: ServerConfig) -> TestServer {
    launch(HttpServer::new(config)).await
}

#[allow(dead_code)]
pub async fn start_with_routes(config: ServerConfig, routes: Router) -> TestServer {
    launch(HttpServer::with_routes(config, routes)).await
}

async fn launch(server: HttpServer) -> TestServer {
    let listener = Listener::bind(&server.config().listener).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let lifecycle = server.lifecycle();

    let handle = tokio::spawn(server.run(listener, shutdown.clone()));
    lifecycle.reached(LifecycleState::Listening).await;

    TestServer {
        addr,
        shutdown,
        lifecycle,
        handle,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
