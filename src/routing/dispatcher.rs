//! Top-level request dispatch.
//!
//! # Responsibilities
//! - Try routers in registration order; the first match wins
//! - Wrap the winning handler in dispatcher middleware (always outermost)
//! - Attach captured parameters to the request before invoking the chain
//! - Answer unmatched requests with 404 and an empty body
//! - Present itself to the host server as a `tower::Service`
//!
//! # Design Decisions
//! - Built once at startup, then shared read-only behind an `Arc`
//! - No match is not an error; it is the only place a 404 is produced

use std::convert::Infallible;
use std::fmt;
use std::future::{ready, Ready};
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::Service;

use super::middleware::{compose, Middleware};
use super::params;
use super::router::{RouteMatch, Router};
use crate::http::ResponseSink;
use crate::observability::metrics;

/// Ordered set of routers plus global middleware.
#[derive(Default)]
pub struct Dispatcher {
    routers: Vec<Router>,
    middleware: Vec<Middleware>,
}

impl Dispatcher {
    /// Aggregate `routers`, keeping their order.
    pub fn build(routers: impl IntoIterator<Item = Router>) -> Self {
        Self {
            routers: routers.into_iter().collect(),
            middleware: Vec::new(),
        }
    }

    /// Append a router after the existing ones.
    pub fn add(&mut self, router: Router) {
        self.routers.push(router);
    }

    /// Append a dispatcher-level middleware. Later registrations wrap
    /// earlier ones, and all of them wrap any router middleware.
    pub fn wrap(&mut self, middleware: Middleware) {
        self.middleware.push(middleware);
    }

    pub fn routers(&self) -> &[Router] {
        &self.routers
    }

    /// Resolve `req` to its fully wrapped handler without running it.
    pub fn resolve(&self, req: &Request<Body>) -> Option<RouteMatch> {
        let found = self.routers.iter().find_map(|r| r.match_request(req))?;
        Some(RouteMatch {
            handler: compose(found.handler, &self.middleware),
            params: found.params,
        })
    }

    /// Dispatch `req`, writing the outcome into `res`.
    pub fn serve(&self, req: &mut Request<Body>, res: &mut ResponseSink) {
        match self.resolve(req) {
            Some(found) => {
                tracing::debug!(
                    method = %req.method(),
                    path = %req.uri().path(),
                    params = found.params.len(),
                    "route matched"
                );
                metrics::record_dispatch("matched");
                params::attach(req, found.params);
                found.handler.serve(req, res);
            }
            None => {
                tracing::debug!(
                    method = %req.method(),
                    path = %req.uri().path(),
                    "no route matched"
                );
                metrics::record_dispatch("not_found");
                res.set_status(StatusCode::NOT_FOUND);
            }
        }
    }

    /// Freeze the dispatcher into a cloneable host-server service.
    pub fn into_service(self) -> DispatchService {
        DispatchService {
            dispatcher: Arc::new(self),
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routers", &self.routers)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

/// [`Dispatcher`] adapted to `tower::Service`, installable on an axum server.
#[derive(Clone, Debug)]
pub struct DispatchService {
    dispatcher: Arc<Dispatcher>,
}

impl DispatchService {
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

impl From<Dispatcher> for DispatchService {
    fn from(dispatcher: Dispatcher) -> Self {
        dispatcher.into_service()
    }
}

impl Service<Request<Body>> for DispatchService {
    type Response = Response;
    type Error = Infallible;
    type Future = Ready<Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let mut res = ResponseSink::new();
        self.dispatcher.serve(&mut req, &mut res);
        ready(Ok(res.into_response()))
    }
}
