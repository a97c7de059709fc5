//! Live proxy process management.
//!
//! # Data Flow
//! ```text
//! rendered configuration text
//!     → controller.rs (write candidate, syntax check, track last-good)
//!     → process.rs (haproxy binary: -c check, -sf graceful reload)
//! ```
//!
//! # Design Decisions
//! - A rejected syntax check rewrites the last known-good configuration;
//!   the live proxy never sees an invalid config
//! - Reload failures are surfaced without retrying; the written
//!   configuration stays in place so the caller can retry the operation

pub mod controller;
pub mod process;

use thiserror::Error;

pub use controller::ProxyController;
pub use process::{HaproxyProcess, ProxyProcess};

/// Failure while validating or reloading the live proxy.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("failed to write proxy configuration: {0}")]
    Write(#[source] std::io::Error),
    #[error("failed to run proxy binary: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("proxy configuration rejected: {0}")]
    InvalidConfig(String),
    #[error("proxy reload failed: {0}")]
    ReloadFailed(String),
}
