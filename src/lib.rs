//! Segment-tree HTTP routing and dispatch.
//!
//! Register path patterns (literal segments, `:name` parameters, `*`
//! catch-alls) on [`Router`]s, aggregate them in a [`Dispatcher`] with
//! global middleware, and install the dispatcher on an axum server.
//!
//! ```
//! use axum::http::Method;
//! use treeroute::routing::{handler_fn, param, Dispatcher, Router};
//!
//! let mut api = Router::new("/v1");
//! api.add(Method::GET, "/hello/:name", handler_fn(|req, res| {
//!     res.write_str("Hello ");
//!     res.write_str(param(req, "name"));
//! }));
//! let dispatcher = Dispatcher::build([api]);
//! # let _ = dispatcher;
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::ServiceConfig;
pub use http::{HttpServer, ResponseSink};
pub use lifecycle::Shutdown;
pub use routing::{Dispatcher, Router};
