//! Peer discovery through service DNS.

use std::io;
use std::net::IpAddr;

use async_trait::async_trait;

/// Capability to enumerate the replicas behind a service name.
#[async_trait]
pub trait PeerResolver: Send + Sync {
    async fn resolve(&self, name: &str) -> Result<Vec<IpAddr>, io::Error>;
}

/// Resolves through the system resolver. Under Swarm and Compose the
/// `tasks.<service>` name returns one A record per replica.
pub struct DnsResolver;

#[async_trait]
impl PeerResolver for DnsResolver {
    async fn resolve(&self, name: &str) -> Result<Vec<IpAddr>, io::Error> {
        let mut ips: Vec<IpAddr> = tokio::net::lookup_host((name, 0))
            .await?
            .map(|addr| addr.ip())
            .collect();
        ips.sort();
        ips.dedup();
        Ok(ips)
    }
}
