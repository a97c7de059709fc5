//! Service registry access.
//!
//! # Responsibilities
//! - List every service registered for this proxy instance
//! - Resolve a service to its live backend endpoints
//! - Persist/delete per-service descriptors so a restarted instance can
//!   reapply them
//!
//! # Design Decisions
//! - Addresses are tried in order; the first responding one wins
//! - Lookups are blocking calls with no built-in retry; retry policy, if
//!   any, belongs to the caller

pub mod consul;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ServiceSpec;

pub use consul::ConsulRegistry;

/// One live backend instance of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendEndpoint {
    pub address: String,
    pub port: u16,
}

/// Capability to query and update the cluster's service registry.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// List every service descriptor registered under `instance`.
    async fn list_services(&self, instance: &str) -> Result<Vec<ServiceSpec>, RegistryError>;

    /// Resolve a service name to its live backend endpoints.
    async fn resolve_backends(&self, service: &str)
        -> Result<Vec<BackendEndpoint>, RegistryError>;

    /// Persist a service descriptor so it survives proxy restarts.
    async fn put_service(&self, instance: &str, spec: &ServiceSpec) -> Result<(), RegistryError>;

    /// Drop a persisted service descriptor.
    async fn delete_service(&self, instance: &str, service: &str) -> Result<(), RegistryError>;
}

/// Registry lookup or update failure.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("registry returned status {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("no registry address answered")]
    NoAddressAvailable,
}
