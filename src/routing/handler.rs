//! Handler capability.
//!
//! A handler processes a matched request and writes its answer into a
//! [`ResponseSink`]. Nothing else is required of it.

use std::fmt;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;

use crate::http::ResponseSink;

/// Processes a matched request.
pub trait Handler: Send + Sync {
    fn serve(&self, req: &mut Request<Body>, res: &mut ResponseSink);
}

/// Reference-counted handler, cheap to clone into middleware closures.
pub type SharedHandler = Arc<dyn Handler>;

impl Handler for SharedHandler {
    fn serve(&self, req: &mut Request<Body>, res: &mut ResponseSink) {
        (**self).serve(req, res)
    }
}

/// Handler backed by a closure. Built with [`handler_fn`].
#[derive(Clone)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&mut Request<Body>, &mut ResponseSink) + Send + Sync,
{
    fn serve(&self, req: &mut Request<Body>, res: &mut ResponseSink) {
        (self.f)(req, res)
    }
}

impl<F> fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerFn").finish_non_exhaustive()
    }
}

/// Turn a closure into a [`Handler`].
///
/// ```
/// use treeroute::routing::{handler_fn, Handler};
///
/// let hello = handler_fn(|_req, res| res.write_str("Hello"));
/// # let _ = &hello as &dyn Handler;
/// ```
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&mut Request<Body>, &mut ResponseSink) + Send + Sync,
{
    HandlerFn { f }
}

/// Move a handler behind an [`Arc`].
pub fn shared<H>(handler: H) -> SharedHandler
where
    H: Handler + 'static,
{
    Arc::new(handler)
}
