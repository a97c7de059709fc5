//! Structured logging.
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level, so a deployment can turn
//!   up verbosity without touching config

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber. `default_filter` applies when
/// `RUST_LOG` is unset; typically the configured log level.
pub fn init(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
