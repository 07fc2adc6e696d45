//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request};
use tokio::net::TcpListener;
use treeroute::config::ServiceConfig;
use treeroute::{Dispatcher, HttpServer, ResponseSink, Shutdown};

/// Build a request with an empty body.
#[allow(dead_code)]
pub fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Dispatch a GET for `uri` and return the collected response.
#[allow(dead_code)]
pub fn dispatch_get(dispatcher: &Dispatcher, uri: &str) -> ResponseSink {
    let mut req = request(Method::GET, uri);
    let mut res = ResponseSink::new();
    dispatcher.serve(&mut req, &mut res);
    res
}

/// Start an HTTP server for `dispatcher` on an ephemeral local port.
#[allow(dead_code)]
pub async fn start_server(dispatcher: Dispatcher) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut config = ServiceConfig::default();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, dispatcher);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // give the accept loop a moment to start
    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}
