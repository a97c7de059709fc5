//! Peer fan-out for cluster-wide reconfiguration.
//!
//! # Responsibilities
//! - Discover every replica of this sidecar through service DNS
//! - Re-issue the original control request to each replica
//! - Aggregate per-peer outcomes without rolling back partial success
//!
//! # Design Decisions
//! - Fan-out is concurrent and always waits for every peer; the first
//!   failure never short-circuits the rest
//! - The forwarded request carries `distribute=false` so a peer applies
//!   locally instead of fanning out again
//! - Peers that already applied a change keep it even when others fail;
//!   the error tells the operator which peers to retry

pub mod caller;
pub mod distributor;
pub mod resolver;

use std::net::SocketAddr;

use thiserror::Error;

pub use caller::{HttpPeerCaller, PeerCaller};
pub use distributor::PeerDistributor;
pub use resolver::{DnsResolver, PeerResolver};

/// The request to replay on each peer: the original path and query with
/// the distribution flag forced off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRequest {
    pub path: String,
    pub query: String,
}

impl PeerRequest {
    /// Build from the incoming request, dropping any `distribute`
    /// parameter so peers apply locally.
    pub fn new(path: &str, query: &str) -> Self {
        let kept: Vec<&str> = query
            .split('&')
            .filter(|pair| !pair.is_empty() && !pair.starts_with("distribute="))
            .collect();
        Self {
            path: path.to_string(),
            query: kept.join("&"),
        }
    }

    pub fn url_for(&self, peer: SocketAddr) -> String {
        if self.query.is_empty() {
            format!("http://{peer}{}", self.path)
        } else {
            format!("http://{peer}{}?{}", self.path, self.query)
        }
    }
}

/// Result of calling one peer.
#[derive(Debug)]
pub struct PeerOutcome {
    pub peer: SocketAddr,
    pub error: Option<String>,
}

impl PeerOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Failure to reach one peer.
#[derive(Debug, Error)]
pub enum PeerError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("peer returned status {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Failure of a distribution round.
#[derive(Debug, Error)]
pub enum DistributionError {
    #[error("peer discovery for {name} failed: {source}")]
    Discovery {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no peers found for {0}")]
    NoPeers(String),
    #[error("{failed} of {total} peers failed")]
    PeerFailures {
        failed: usize,
        total: usize,
        outcomes: Vec<PeerOutcome>,
    },
}
