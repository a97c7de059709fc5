//! HTTP transport for peer calls.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;

use crate::distribute::{PeerError, PeerRequest};

/// Capability to replay a control request against one peer.
#[async_trait]
pub trait PeerCaller: Send + Sync {
    async fn call(&self, peer: SocketAddr, request: &PeerRequest) -> Result<(), PeerError>;
}

/// Calls peers over plain HTTP with a bounded per-request timeout, so a
/// hung replica cannot stall the whole round.
pub struct HttpPeerCaller {
    client: reqwest::Client,
}

impl HttpPeerCaller {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }
}

#[async_trait]
impl PeerCaller for HttpPeerCaller {
    async fn call(&self, peer: SocketAddr, request: &PeerRequest) -> Result<(), PeerError> {
        let url = request.url_for(peer);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| PeerError::Transport {
                url: url.clone(),
                source,
            })?;
        if !response.status().is_success() {
            return Err(PeerError::Status {
                url,
                status: response.status(),
            });
        }
        Ok(())
    }
}
