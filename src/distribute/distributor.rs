//! Fan-out orchestration.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::future::join_all;

use crate::distribute::{
    DistributionError, PeerCaller, PeerOutcome, PeerRequest, PeerResolver,
};
use crate::observability::metrics;

/// Replays one control request on every replica of the sidecar service.
pub struct PeerDistributor {
    resolver: Arc<dyn PeerResolver>,
    caller: Arc<dyn PeerCaller>,
    service_name: String,
    port: u16,
}

impl PeerDistributor {
    pub fn new(
        resolver: Arc<dyn PeerResolver>,
        caller: Arc<dyn PeerCaller>,
        service_name: String,
        port: u16,
    ) -> Self {
        Self {
            resolver,
            caller,
            service_name,
            port,
        }
    }

    /// Resolve the peer set and call every peer concurrently. Every call
    /// runs to completion; any failure yields an error naming the peers
    /// that must be retried, while the ones that succeeded keep their
    /// new configuration.
    pub async fn distribute(&self, request: &PeerRequest) -> Result<(), DistributionError> {
        let ips = self
            .resolver
            .resolve(&self.service_name)
            .await
            .map_err(|source| DistributionError::Discovery {
                name: self.service_name.clone(),
                source,
            })?;
        if ips.is_empty() {
            return Err(DistributionError::NoPeers(self.service_name.clone()));
        }

        let peers: Vec<SocketAddr> = ips
            .into_iter()
            .map(|ip| SocketAddr::new(ip, self.port))
            .collect();
        tracing::info!(peers = peers.len(), path = %request.path, "distributing to peers");

        let calls = peers.iter().map(|&peer| async move {
            let result = self.caller.call(peer, request).await;
            PeerOutcome {
                peer,
                error: result.err().map(|err| err.to_string()),
            }
        });
        let outcomes = join_all(calls).await;

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        if failed > 0 {
            for outcome in outcomes.iter().filter(|o| !o.is_success()) {
                tracing::warn!(
                    peer = %outcome.peer,
                    error = outcome.error.as_deref().unwrap_or(""),
                    "peer call failed"
                );
            }
            metrics::record_distribution_failure();
            return Err(DistributionError::PeerFailures {
                failed,
                total: outcomes.len(),
                outcomes,
            });
        }
        Ok(())
    }
}
