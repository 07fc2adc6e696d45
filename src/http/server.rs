//! HTTP server setup.
//!
//! # Responsibilities
//! - Install the dispatcher as the only service of an axum router
//! - Wire up transport-level middleware (tracing, request timeout)
//! - Serve on a listener until shutdown is signalled
//!
//! # Design Decisions
//! - Everything routing-related lives in the dispatcher; axum only
//!   contributes the listener loop and HTTP/1.1 + HTTP/2 handling
//! - Graceful shutdown drains in-flight requests

use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::routing::{DispatchService, Dispatcher};

/// Errors from binding or serving.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// HTTP server hosting a [`Dispatcher`].
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    pub fn new(config: ServiceConfig, dispatcher: Dispatcher) -> Self {
        let router = Self::build_router(&config, dispatcher.into_service());
        Self { router, config }
    }

    /// Build the axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, service: DispatchService) -> Router {
        Router::new()
            .fallback_service(service)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Serve on `listener` until a message arrives on `shutdown`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}
