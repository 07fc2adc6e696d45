//! Middleware capability and the stock layers.
//!
//! A middleware turns one handler into another. Routers and the dispatcher
//! keep them in registration order and fold them over the matched handler:
//!
//! ```text
//! handler = m1(handler)
//! handler = m2(handler)   // m2 is now outermost
//! ```
//!
//! The most recently registered middleware therefore runs first on the way
//! in and last on the way out. A layer that returns without calling `next`
//! short-circuits everything inside it.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Request};

use super::handler::{Handler, SharedHandler};
use crate::http::ResponseSink;
use crate::observability::metrics;

/// Handler transform used for wrapping.
pub type Middleware = Arc<dyn Fn(SharedHandler) -> SharedHandler + Send + Sync>;

/// Header carrying the per-request identifier.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Apply `middleware` to `handler` in registration order.
pub fn compose(handler: SharedHandler, middleware: &[Middleware]) -> SharedHandler {
    middleware.iter().fold(handler, |inner, wrap| wrap(inner))
}

/// Layer produced by [`from_fn`].
struct FnLayer<F> {
    f: Arc<F>,
    next: SharedHandler,
}

impl<F> Handler for FnLayer<F>
where
    F: Fn(&mut Request<Body>, &mut ResponseSink, &dyn Handler) + Send + Sync,
{
    fn serve(&self, req: &mut Request<Body>, res: &mut ResponseSink) {
        (self.f)(req, res, self.next.as_ref())
    }
}

/// Build a middleware from a function receiving the next handler.
///
/// ```
/// use treeroute::routing::middleware;
///
/// let marker = middleware::from_fn(|req, res, next| {
///     res.write_str("before ");
///     next.serve(req, res);
///     res.write_str(" after");
/// });
/// # let _ = marker;
/// ```
pub fn from_fn<F>(f: F) -> Middleware
where
    F: Fn(&mut Request<Body>, &mut ResponseSink, &dyn Handler) + Send + Sync + 'static,
{
    let f = Arc::new(f);
    Arc::new(move |next: SharedHandler| -> SharedHandler {
        Arc::new(FnLayer {
            f: Arc::clone(&f),
            next,
        })
    })
}

/// Set a response header, then continue.
pub fn set_header(name: HeaderName, value: HeaderValue) -> Middleware {
    from_fn(move |req, res, next| {
        res.set_header(name.clone(), value.clone());
        next.serve(req, res);
    })
}

/// Tag the request with an `x-request-id` and echo it on the response.
///
/// An id already present on the request is kept.
pub fn request_id() -> Middleware {
    from_fn(|req, res, next| {
        let name = HeaderName::from_static(X_REQUEST_ID);
        let id = match req.headers().get(&name) {
            Some(existing) => existing.clone(),
            None => {
                let generated = uuid::Uuid::new_v4().to_string();
                match HeaderValue::from_str(&generated) {
                    Ok(value) => value,
                    Err(_) => return next.serve(req, res),
                }
            }
        };
        req.headers_mut().insert(name.clone(), id.clone());
        next.serve(req, res);
        res.set_header(name, id);
    })
}

/// One structured log line per request, plus duration metrics.
pub fn access_log() -> Middleware {
    from_fn(|req, res, next| {
        let start = Instant::now();
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        next.serve(req, res);

        let status = res.status();
        tracing::info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_us = start.elapsed().as_micros() as u64,
            request_id = req
                .headers()
                .get(X_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-"),
            "request served"
        );
        metrics::record_request(method.as_str(), status.as_u16(), start);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::handler::{handler_fn, shared};
    use axum::http::header::CONTENT_TYPE;

    fn marker(before: &'static str, after: &'static str) -> Middleware {
        from_fn(move |req, res, next| {
            res.write_str(before);
            next.serve(req, res);
            res.write_str(after);
        })
    }

    fn run(handler: &SharedHandler) -> ResponseSink {
        let mut req = Request::new(Body::empty());
        let mut res = ResponseSink::new();
        handler.serve(&mut req, &mut res);
        res
    }

    #[test]
    fn test_last_registered_is_outermost() {
        let inner = shared(handler_fn(|_req, res| res.write_str("H")));
        let chain = compose(inner, &[marker("a", "b"), marker("c", "d")]);
        assert_eq!(run(&chain).body_text(), "caHbd");
    }

    #[test]
    fn test_no_middleware_is_identity() {
        let inner = shared(handler_fn(|_req, res| res.write_str("H")));
        let chain = compose(inner, &[]);
        assert_eq!(run(&chain).body_text(), "H");
    }

    #[test]
    fn test_declining_next_skips_inner_layers() {
        let inner = shared(handler_fn(|_req, res| res.write_str("H")));
        let stop = from_fn(|_req, res, _next| res.write_str("stop"));
        let chain = compose(inner, &[marker("a", "b"), stop, marker("x", "y")]);
        assert_eq!(run(&chain).body_text(), "xstopy");
    }

    #[test]
    fn test_set_header() {
        let inner = shared(handler_fn(|_req, res| res.write_str("{}")));
        let chain = compose(
            inner,
            &[set_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        );
        let res = run(&chain);
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_request_id_is_generated_and_echoed() {
        let inner = shared(handler_fn(|req, res| {
            let seen = req.headers().contains_key(X_REQUEST_ID);
            res.write_str(if seen { "seen" } else { "missing" });
        }));
        let chain = compose(inner, &[request_id()]);
        let res = run(&chain);

        assert_eq!(res.body_text(), "seen");
        let id = res.headers()[X_REQUEST_ID].to_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }

    #[test]
    fn test_request_id_keeps_existing() {
        let inner = shared(handler_fn(|_req, _res| {}));
        let chain = compose(inner, &[request_id()]);

        let mut req = Request::builder()
            .header(X_REQUEST_ID, "abc-123")
            .body(Body::empty())
            .unwrap();
        let mut res = ResponseSink::new();
        chain.serve(&mut req, &mut res);
        assert_eq!(res.headers()[X_REQUEST_ID], "abc-123");
    }

    #[test]
    fn test_access_log_passes_through() {
        let inner = shared(handler_fn(|_req, res| res.write_str("ok")));
        let chain = compose(inner, &[access_log()]);
        assert_eq!(run(&chain).body_text(), "ok");
    }
}
