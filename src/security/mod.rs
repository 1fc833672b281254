//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming forward request:
//!     → RequestBodyLimitLayer (security.max_body_size, 413 on overflow)
//! Outbound call:
//!     → headers.rs (force Accept-Encoding: identity)
//! Origin response:
//!     → headers.rs (strip hop-by-hop and encoding headers, fix Content-Length)
//! ```

pub mod headers;

pub use headers::{filter_response_headers, force_identity_encoding};
