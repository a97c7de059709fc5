//! Metrics collection.
//!
//! # Metrics
//! - `proxy_reloads_total` (counter): successful proxy reloads
//! - `proxy_reload_failures_total` (counter): failed reloads by reason
//! - `proxy_distribution_failures_total` (counter): fan-out rounds with at
//!   least one failed peer
//!
//! # Design Decisions
//! - Counters only; reload latency is visible in logs and not worth a
//!   histogram at reload frequencies
//! - Recording is a no-op until an exporter is installed, so library
//!   callers pay nothing

use metrics::counter;

pub fn record_reload() {
    counter!("proxy_reloads_total").increment(1);
}

/// `reason` is "syntax" for a rejected candidate and "reload" for a
/// failed reload signal.
pub fn record_reload_failure(reason: &'static str) {
    counter!("proxy_reload_failures_total", "reason" => reason).increment(1);
}

pub fn record_distribution_failure() {
    counter!("proxy_distribution_failures_total").increment(1);
}
