//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, POST / handler)
//!     → request.rs (decode ForwardRequest, 400 on bad input)
//!     → [upstream::Forwarder executes the outbound call]
//!     → response.rs (filtered headers, exact Content-Length)
//!     → error.rs (JSON error bodies)
//!     → Send to client
//! ```

pub mod error;
pub mod request;
pub mod response;
pub mod server;

pub use error::RelayError;
pub use request::ForwardRequest;
pub use response::ForwardResponse;
pub use server::RelayServer;
