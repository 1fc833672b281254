//! HTTP forwarding relay and resource-inlining client.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌───────────────────────────── va-relay ─────────────────────────────┐
//!   POST / {url,  │  ┌─────────┐   ┌──────────┐   ┌────────────┐   ┌──────────────┐   │
//!   method, ...}  │  │   net   │──▶│   http   │──▶│  upstream  │──▶│    origin    │───┼──▶ Origin
//!  ───────────────┼─▶│listener │   │  server  │   │ forwarder  │   │ (redirects,  │   │
//!                 │  └─────────┘   └────┬─────┘   └─────┬──────┘   │   timeout)   │   │
//!   raw body +    │                     │               ▼          └──────────────┘   │
//!   filtered hdrs │                     │        ┌────────────┐                       │
//!  ◀──────────────┼─────────────────────┴────────│  security  │                       │
//!                 │                              │  headers   │                       │
//!                 │                              └────────────┘                       │
//!                 │   config · observability · lifecycle                               │
//!                 └────────────────────────────────────────────────────────────────────┘
//!
//!   va-browse ── browser::client ──▶ va-relay (page) ──▶ browser::inline ──▶ va-relay (assets)
//! ```

// Forwarding service
pub mod config;
pub mod http;
pub mod net;
pub mod security;
pub mod upstream;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

// Client
pub mod browser;

pub use config::RelayConfig;
pub use http::RelayServer;
pub use lifecycle::Shutdown;
