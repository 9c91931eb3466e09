//! Graceful shutdown, timeouts and startup failures.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{routing::get, Router};
use hello_server::config::GuardMode;
use hello_server::http::ServerError;
use hello_server::lifecycle::{startup, LifecycleState};
use hello_server::net::ListenerError;
use reqwest::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Notify;

mod common;

/// `/slow` signals `started`, then sleeps for `delay` before answering.
fn slow_routes(started: Arc<Notify>, delay: Duration) -> Router {
    Router::new().route(
        "/slow",
        get(move || {
            let started = started.clone();
            async move {
                started.notify_one();
                tokio::time::sleep(delay).await;
                "done"
            }
        }),
    )
}

#[tokio::test]
async fn in_flight_request_completes_and_new_connections_are_refused() {
    let started = Arc::new(Notify::new());
    let server = common::start_with_routes(
        common::config(GuardMode::None),
        slow_routes(started.clone(), Duration::from_millis(500)),
    )
    .await;

    let url = server.url("/slow");
    let in_flight = tokio::spawn(async move {
        let res = common::client().get(url).send().await?;
        let status = res.status();
        res.text().await.map(|body| (status, body))
    });
    started.notified().await;

    assert!(server.shutdown.trigger());
    server.lifecycle.reached(LifecycleState::ShuttingDown).await;

    assert!(
        TcpStream::connect(server.addr).await.is_err(),
        "listener should be closed once shutdown starts"
    );

    let (status, body) = in_flight.await.unwrap().unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "done");

    server.handle.await.unwrap().unwrap();
    assert_eq!(server.lifecycle.current(), LifecycleState::Stopped);
}

#[tokio::test]
async fn shutdown_gives_up_after_the_timeout() {
    let started = Arc::new(Notify::new());
    let mut config = common::config(GuardMode::None);
    config.timeouts.shutdown_secs = 1;
    let server = common::start_with_routes(
        config,
        slow_routes(started.clone(), Duration::from_secs(5)),
    )
    .await;

    let url = server.url("/slow");
    let in_flight = tokio::spawn(async move { common::client().get(url).send().await });
    started.notified().await;

    let began = Instant::now();
    server.shutdown.trigger();
    let result = server.handle.await.unwrap();

    assert!(matches!(
        result,
        Err(ServerError::ShutdownTimeout { in_flight: 1, .. })
    ));
    assert!(began.elapsed() < Duration::from_secs(4));
    assert_eq!(server.lifecycle.current(), LifecycleState::Stopped);

    // The aborted connection is dropped without a response.
    assert!(in_flight.await.unwrap().is_err());
}

#[tokio::test]
async fn idle_keep_alive_connection_is_closed() {
    let mut config = common::config(GuardMode::None);
    config.timeouts.idle_secs = 1;
    let server = common::start(config).await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(b"GET /hello HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();

    let mut response = Vec::new();
    let mut buf = [0u8; 1024];
    while !String::from_utf8_lossy(&response).contains("says Hello!") {
        let n = stream.read(&mut buf).await.unwrap();
        assert!(n > 0, "connection closed before the response");
        response.extend_from_slice(&buf[..n]);
    }
    assert!(String::from_utf8_lossy(&response).starts_with("HTTP/1.1 200"));

    // Still open shortly after the response.
    assert!(
        tokio::time::timeout(Duration::from_millis(300), stream.read(&mut buf))
            .await
            .is_err()
    );

    // Closed once the idle timeout passes.
    let n = tokio::time::timeout(Duration::from_secs(3), stream.read(&mut buf))
        .await
        .expect("idle connection should be closed")
        .unwrap();
    assert_eq!(n, 0);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn slow_handler_hits_the_write_timeout() {
    let started = Arc::new(Notify::new());
    let mut config = common::config(GuardMode::None);
    config.timeouts.write_secs = 1;
    let server = common::start_with_routes(
        config,
        slow_routes(started, Duration::from_secs(3)),
    )
    .await;

    let res = common::client().get(server.url("/slow")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::REQUEST_TIMEOUT);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn bind_failure_is_returned() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let mut config = common::config(GuardMode::None);
    config.listener.port = taken.local_addr().unwrap().port();

    let result = tokio::time::timeout(Duration::from_secs(5), startup::launch(config))
        .await
        .expect("launch should fail fast");

    assert!(matches!(
        result,
        Err(ServerError::Listener(ListenerError::Bind { .. }))
    ));
}
