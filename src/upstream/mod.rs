//! Origin-facing side of the relay.
//!
//! # Data Flow
//! ```text
//! ForwardRequest
//!     → forwarder.rs (method, headers, params, JSON payload)
//!     → origin (redirects followed, timeout enforced)
//!     → ForwardResponse (buffered body, filtered headers)
//! ```

pub mod forwarder;

pub use forwarder::Forwarder;
