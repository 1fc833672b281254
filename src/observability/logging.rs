//! Structured logging.
//!
//! `RUST_LOG` wins over the configured level. JSON lines for production,
//! human-readable output for development.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(level: &str) -> String {
    format!("va_relay={level},tower_http={level}")
}

/// Install the global tracing subscriber.
pub fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(&config.log_level).into());

    let subscriber = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => subscriber.with(fmt::layer().json()).init(),
        LogFormat::Pretty => subscriber.with(fmt::layer()).init(),
    }
}
