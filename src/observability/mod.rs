//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (reload and fan-out counters)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Whatever metrics exporter the binary installs
//! ```
//!
//! # Design Decisions
//! - Metrics are cheap (atomic increments) and recorded unconditionally
//! - The library never installs an exporter; that is the binary's choice

pub mod logging;
pub mod metrics;
