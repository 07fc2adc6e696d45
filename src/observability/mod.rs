//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Routing and middleware produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Metric updates are fire-and-forget; without an installed recorder
//!   they are no-ops

pub mod logging;
pub mod metrics;
