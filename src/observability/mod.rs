//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and the forwarder produce:
//!     → logging.rs (structured log events, request-id spans from tower-http)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
