//! Host-server side of the dispatcher.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum listener, tower-http layers)
//!     → routing::DispatchService (match, middleware, handler)
//!     → response.rs (sink collected by the handler chain)
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use response::ResponseSink;
pub use server::{HttpServer, ServerError};
