//! Startup orchestration.
//!
//! # Responsibilities
//! - Assemble the dispatcher served by the binary
//! - Initialize metrics, bind the listener, run until a shutdown signal
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method, StatusCode};
use serde_json::json;
use tokio::net::TcpListener;

use crate::config::{RoutingConfig, ServiceConfig};
use crate::http::{HttpServer, ResponseSink, ServerError};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::routing::{handler_fn, middleware, param, Dispatcher, Router};

/// Build the dispatcher exposed by the binary.
///
/// Routes under `config.prefix`:
/// - `GET /hello/:name`
/// - `GET /hello/:first/:last`
/// - `* /static/*`
pub fn build_dispatcher(config: &RoutingConfig) -> Dispatcher {
    let mut api = Router::with_policy(config.prefix.as_str(), config.method_policy);
    api.add(
        Method::GET,
        "/hello/:name",
        handler_fn(|req, res| write_json(res, &json!({ "hello": param(req, "name") }))),
    );
    api.add(
        Method::GET,
        "/hello/:first/:last",
        handler_fn(|req, res| {
            let name = format!("{} {}", param(req, "first"), param(req, "last"));
            write_json(res, &json!({ "hello": name }));
        }),
    );
    api.any(
        "/static/*",
        handler_fn(|req, res| write_json(res, &json!({ "path": req.uri().path() }))),
    );
    api.wrap(middleware::set_header(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    ));

    let mut dispatcher = Dispatcher::build([api]);
    dispatcher.wrap(middleware::access_log());
    // outermost, so the access log sees the id
    dispatcher.wrap(middleware::request_id());
    dispatcher
}

fn write_json(res: &mut ResponseSink, value: &serde_json::Value) {
    match serde_json::to_vec(value) {
        Ok(body) => res.write(&body),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode response");
            res.set_status(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

/// Run the service described by `config` until SIGINT/SIGTERM.
pub async fn run(config: ServiceConfig) -> Result<(), ServerError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let dispatcher = build_dispatcher(&config.routing);
    tracing::info!(
        prefix = %config.routing.prefix,
        policy = ?config.routing.method_policy,
        routes = dispatcher.routers().iter().map(Router::route_count).sum::<usize>(),
        "Routes registered"
    );

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(ServerError::Bind)?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, dispatcher);
    let server_shutdown = shutdown.subscribe();

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        trigger.trigger();
    });

    server.run(listener, server_shutdown).await
}
