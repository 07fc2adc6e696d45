//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     Router::add(method, pattern, handler)
//!     → tree.rs (insert segment chain, bind handler at the leaf)
//!     Router::wrap / Dispatcher::wrap (append middleware)
//!
//! Incoming Request (method, path)
//!     → dispatcher.rs (try routers in order, first match wins)
//!     → router.rs (tree lookup + router middleware)
//!     → dispatcher.rs (dispatcher middleware, attach params, invoke)
//!     → no router matched: 404 with empty body
//! ```
//!
//! # Pattern Syntax
//! - `name`: literal segment, exact text match
//! - `:name`: parameter, binds the segment text to `name`
//! - `*`: catch-all, matches every remaining segment
//!
//! # Design Decisions
//! - Routes built at startup, immutable at runtime
//! - No regex in the hot path
//! - Explicit match result instead of ambient request state

pub mod dispatcher;
pub mod handler;
pub mod middleware;
pub mod params;
pub mod router;
pub mod tree;

pub use dispatcher::{DispatchService, Dispatcher};
pub use handler::{handler_fn, shared, Handler, HandlerFn, SharedHandler};
pub use middleware::Middleware;
pub use params::{param, params, Params};
pub use router::{MethodPolicy, RouteMatch, Router};
pub use tree::PathTree;
