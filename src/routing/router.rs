//! Prefix-scoped route table.
//!
//! # Responsibilities
//! - Register `(method, pattern)` pairs under a URL prefix
//! - Look up the handler for a request and wrap it in router middleware
//! - Return an explicit match result (handler + captured parameters)
//!
//! # Design Decisions
//! - Mutated only during startup; immutable while serving (no locks)
//! - Method handling is a policy: `Discriminate` keys leaves by method with
//!   an any-method fallback, `Ignore` dispatches purely on path
//! - HEAD is answered by the GET handler unless a HEAD handler is registered
//! - Middleware is folded per match, so `wrap` after `add` still applies

use std::collections::HashMap;
use std::fmt;

use axum::body::Body;
use axum::http::{Method, Request};
use serde::{Deserialize, Serialize};

use super::handler::{shared, Handler, SharedHandler};
use super::middleware::{compose, Middleware};
use super::params::Params;
use super::tree::PathTree;

/// How the request method takes part in route identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodPolicy {
    /// `(method, path)` is the route key.
    #[default]
    Discriminate,
    /// Only the path matters; handlers branch on method themselves.
    Ignore,
}

/// Handlers bound to one path pattern.
#[derive(Default)]
struct Endpoint {
    methods: HashMap<Method, SharedHandler>,
    any: Option<SharedHandler>,
}

impl Endpoint {
    /// Exact method first, then GET for HEAD, then the any-method handler.
    fn handler_for(&self, method: &Method) -> Option<&SharedHandler> {
        self.methods
            .get(method)
            .or_else(|| {
                if *method == Method::HEAD {
                    self.methods.get(&Method::GET)
                } else {
                    None
                }
            })
            .or(self.any.as_ref())
    }

    fn len(&self) -> usize {
        self.methods.len() + usize::from(self.any.is_some())
    }
}

/// Outcome of a successful lookup.
pub struct RouteMatch {
    /// Matched handler, already wrapped in the router's middleware.
    pub handler: SharedHandler,
    /// Parameters captured along the matched path.
    pub params: Params,
}

impl fmt::Debug for RouteMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Route table scoped under a prefix.
pub struct Router {
    prefix: String,
    policy: MethodPolicy,
    tree: PathTree<Endpoint>,
    middleware: Vec<Middleware>,
}

impl Router {
    /// Create an empty router with the default method policy.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_policy(prefix, MethodPolicy::default())
    }

    pub fn with_policy(prefix: impl Into<String>, policy: MethodPolicy) -> Self {
        Self {
            prefix: prefix.into(),
            policy,
            tree: PathTree::new(),
            middleware: Vec::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn policy(&self) -> MethodPolicy {
        self.policy
    }

    /// Register `handler` for `method` on `prefix + path`.
    ///
    /// Registering the same key again replaces the earlier handler. Under
    /// [`MethodPolicy::Ignore`] the method is not part of the key.
    pub fn add<H>(&mut self, method: Method, path: &str, handler: H)
    where
        H: Handler + 'static,
    {
        let pattern = join(&self.prefix, path);
        let endpoint = self.tree.slot_mut(&pattern).get_or_insert_with(Endpoint::default);
        match self.policy {
            MethodPolicy::Discriminate => {
                endpoint.methods.insert(method.clone(), shared(handler));
            }
            MethodPolicy::Ignore => endpoint.any = Some(shared(handler)),
        }
        tracing::debug!(method = %method, pattern = %pattern, "route registered");
    }

    /// Register `handler` on `prefix + path` for every method.
    pub fn any<H>(&mut self, path: &str, handler: H)
    where
        H: Handler + 'static,
    {
        let pattern = join(&self.prefix, path);
        let endpoint = self.tree.slot_mut(&pattern).get_or_insert_with(Endpoint::default);
        endpoint.any = Some(shared(handler));
        tracing::debug!(method = "*", pattern = %pattern, "route registered");
    }

    /// Append a middleware. Later registrations wrap earlier ones.
    pub fn wrap(&mut self, middleware: Middleware) {
        self.middleware.push(middleware);
    }

    /// Find the handler for `req`, wrapped in this router's middleware.
    pub fn match_request(&self, req: &Request<Body>) -> Option<RouteMatch> {
        let method = req.method();
        let (handler, params) = self
            .tree
            .find(req.uri().path(), |endpoint| endpoint.handler_for(method))?;

        Some(RouteMatch {
            handler: compose(handler.clone(), &self.middleware),
            params,
        })
    }

    /// Number of registered `(method, pattern)` bindings.
    pub fn route_count(&self) -> usize {
        self.tree.values().map(Endpoint::len).sum()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("prefix", &self.prefix)
            .field("policy", &self.policy)
            .field("routes", &self.route_count())
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

fn join(prefix: &str, path: &str) -> String {
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ResponseSink;
    use crate::routing::handler::handler_fn;
    use crate::routing::middleware::from_fn;

    fn hello() -> impl Handler {
        handler_fn(|_req, res| res.write_str("Hello test!"))
    }

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        request(Method::GET, uri)
    }

    #[test]
    fn test_root_match() {
        let mut router = Router::new("/");
        router.add(Method::GET, "/", hello());

        assert!(router.match_request(&get("/")).is_some());
        assert!(router.match_request(&get("http://example.com")).is_some());
    }

    #[test]
    fn test_prefixed_routes() {
        let mut router = Router::new("/v1");
        router.add(Method::GET, "/test", hello());
        router.add(Method::GET, "/test/1/2/3/4/5/6", hello());

        for uri in [
            "http://example.com/v1/test",
            "http://example.com/v1/test/",
            "http://example.com/v1/test/1/2/3/4/5/6",
            "http://example.com/v1/test/1/2/3/4/5/6/",
        ] {
            assert!(router.match_request(&get(uri)).is_some(), "{uri} should match");
        }

        for uri in [
            "http://example.com/v1",
            "http://example.com/v1/",
            "http://example.com/v1/test/1/2/3/4/5",
            "http://example.com",
            "http://example.com/",
            "http://example.com/something/else",
        ] {
            assert!(router.match_request(&get(uri)).is_none(), "{uri} should not match");
        }
    }

    #[test]
    fn test_prefix_join_tolerates_slashes() {
        let mut router = Router::new("/v1/");
        router.add(Method::GET, "test", hello());
        assert!(router.match_request(&get("/v1/test")).is_some());
    }

    #[test]
    fn test_params_are_returned_with_match() {
        let mut router = Router::new("/");
        router.add(Method::GET, "/:test", hello());
        router.add(Method::GET, "/:test/1", hello());
        router.add(Method::GET, "/:test/1/2", hello());
        router.add(Method::GET, "/1/2/:param", hello());
        router.add(Method::GET, "/1/2/:param1/3/4/:param2", hello());

        let found = router.match_request(&get("/1/2/value1/3/4/value2")).unwrap();
        assert_eq!(found.params.get("param1"), Some("value1"));
        assert_eq!(found.params.get("param2"), Some("value2"));
        assert_eq!(found.params.get("invalid"), None);

        let found = router.match_request(&get("/value/1/2")).unwrap();
        assert_eq!(found.params.get("test"), Some("value"));
    }

    #[test]
    fn test_method_discrimination() {
        let mut router = Router::new("/");
        router.add(Method::GET, "/plan", handler_fn(|_req, res| res.write_str("list")));
        router.add(Method::POST, "/plan", handler_fn(|_req, res| res.write_str("create")));

        let run = |method: Method| {
            let mut req = request(method, "/plan");
            let found = router.match_request(&req)?;
            let mut res = ResponseSink::new();
            found.handler.serve(&mut req, &mut res);
            Some(res.body_text())
        };

        assert_eq!(run(Method::GET).as_deref(), Some("list"));
        assert_eq!(run(Method::POST).as_deref(), Some("create"));
        assert_eq!(run(Method::DELETE), None);
        assert_eq!(router.route_count(), 2);
    }

    #[test]
    fn test_method_mismatch_backtracks_to_other_branch() {
        let mut router = Router::new("/");
        router.add(Method::POST, "/items/:id", hello());
        router.add(Method::GET, "/items/new", hello());

        let found = router.match_request(&get("/items/new")).unwrap();
        assert!(found.params.is_empty());
    }

    #[test]
    fn test_any_is_fallback_after_exact_method() {
        let mut router = Router::new("/");
        router.any("/plan/:id", handler_fn(|_req, res| res.write_str("any")));
        router.add(Method::PUT, "/plan/:id", handler_fn(|_req, res| res.write_str("put")));

        let mut res = ResponseSink::new();
        let mut req = request(Method::PUT, "/plan/1");
        router.match_request(&req).unwrap().handler.serve(&mut req, &mut res);
        assert_eq!(res.body_text(), "put");

        let mut res = ResponseSink::new();
        let mut req = request(Method::DELETE, "/plan/1");
        router.match_request(&req).unwrap().handler.serve(&mut req, &mut res);
        assert_eq!(res.body_text(), "any");
    }

    #[test]
    fn test_head_falls_back_to_get() {
        let mut router = Router::new("/v1");
        router.add(Method::GET, "/hello/:name", handler_fn(|_req, res| res.write_str("get")));
        router.add(Method::GET, "/plan", handler_fn(|_req, res| res.write_str("get")));
        router.add(Method::HEAD, "/plan", handler_fn(|_req, res| res.write_str("head")));

        let run = |uri: &str| {
            let mut req = request(Method::HEAD, uri);
            let found = router.match_request(&req)?;
            let mut res = ResponseSink::new();
            found.handler.serve(&mut req, &mut res);
            Some(res.body_text())
        };

        assert_eq!(run("/v1/hello/joe").as_deref(), Some("get"));
        assert_eq!(run("/v1/plan").as_deref(), Some("head"));
        assert!(router
            .match_request(&request(Method::POST, "/v1/hello/joe"))
            .is_none());
    }

    #[test]
    fn test_decoded_parameter_reaches_match() {
        let mut router = Router::new("/v1");
        router.add(Method::GET, "/hello/:name", hello());

        let found = router.match_request(&get("/v1/hello/joe%20smith")).unwrap();
        assert_eq!(found.params.get("name"), Some("joe smith"));
    }

    #[test]
    fn test_ignore_policy_dispatches_on_path_only() {
        let mut router = Router::with_policy("/", MethodPolicy::Ignore);
        router.add(Method::GET, "/plan", handler_fn(|_req, res| res.write_str("first")));
        router.add(Method::POST, "/plan", handler_fn(|_req, res| res.write_str("second")));

        let mut req = request(Method::DELETE, "/plan");
        let found = router.match_request(&req).unwrap();
        let mut res = ResponseSink::new();
        found.handler.serve(&mut req, &mut res);
        assert_eq!(res.body_text(), "second");
        assert_eq!(router.route_count(), 1);
    }

    #[test]
    fn test_router_middleware_wraps_match() {
        let mut router = Router::new("/");
        router.add(Method::GET, "/", handler_fn(|_req, res| res.write_str("Handler")));
        router.wrap(from_fn(|req, res, next| {
            res.write_str("2");
            next.serve(req, res);
            res.write_str("3");
        }));
        router.wrap(from_fn(|req, res, next| {
            res.write_str("1");
            next.serve(req, res);
            res.write_str("4");
        }));

        let mut req = get("/");
        let found = router.match_request(&req).unwrap();
        let mut res = ResponseSink::new();
        found.handler.serve(&mut req, &mut res);
        assert_eq!(res.body_text(), "12Handler34");
    }

    #[test]
    fn test_serde_policy_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: MethodPolicy,
        }
        let parsed: Wrapper = toml::from_str("policy = \"ignore\"").unwrap();
        assert_eq!(parsed.policy, MethodPolicy::Ignore);
    }
}
