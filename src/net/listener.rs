//! TCP listener setup.
//!
//! The concurrency cap (`listener.max_connections`) is enforced by the HTTP
//! server's middleware stack; this module only binds.

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Configured address is not a socket address.
    #[error("Invalid bind address {0:?}")]
    Address(String),
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    Bind(#[from] std::io::Error),
}

/// Bind to the configured address.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, ListenerError> {
    let addr: SocketAddr = config
        .bind_address
        .parse()
        .map_err(|_| ListenerError::Address(config.bind_address.clone()))?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        max_connections = config.max_connections,
        "Listener bound"
    );
    Ok(listener)
}
