//! Consul-backed registry client.
//!
//! Service descriptors live in the KV store under
//! `flow-proxy/{instance}/{service}` as JSON; backend endpoints come from
//! the catalog API.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::model::ServiceSpec;
use crate::registry::{BackendEndpoint, RegistryClient, RegistryError};

const KV_ROOT: &str = "flow-proxy";

pub struct ConsulRegistry {
    addresses: Vec<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct CatalogService {
    #[serde(rename = "Address")]
    address: String,
    #[serde(default, rename = "ServiceAddress")]
    service_address: String,
    #[serde(rename = "ServicePort")]
    service_port: u16,
}

impl ConsulRegistry {
    /// `addresses` must already be scheme-normalized.
    pub fn new(addresses: Vec<String>) -> Self {
        Self {
            addresses,
            client: reqwest::Client::new(),
        }
    }

    fn kv_url(address: &str, instance: &str, service: &str) -> String {
        format!("{address}/v1/kv/{KV_ROOT}/{instance}/{service}")
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
    ) -> Result<Option<T>, RegistryError> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| RegistryError::Request {
                url: url.clone(),
                source,
            })?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(RegistryError::Status {
                url,
                status: response.status(),
            });
        }
        let value = response
            .json()
            .await
            .map_err(|source| RegistryError::Request { url, source })?;
        Ok(Some(value))
    }

    async fn list_from(
        &self,
        address: &str,
        instance: &str,
    ) -> Result<Vec<ServiceSpec>, RegistryError> {
        let keys_url = format!("{address}/v1/kv/{KV_ROOT}/{instance}/?keys");
        let keys: Vec<String> = match self.get_json(keys_url).await? {
            Some(keys) => keys,
            None => return Ok(Vec::new()),
        };
        let mut services = Vec::with_capacity(keys.len());
        for key in keys {
            let value_url = format!("{address}/v1/kv/{key}?raw");
            if let Some(spec) = self.get_json::<ServiceSpec>(value_url).await? {
                services.push(spec);
            }
        }
        Ok(services)
    }

    async fn resolve_from(
        &self,
        address: &str,
        service: &str,
    ) -> Result<Vec<BackendEndpoint>, RegistryError> {
        let url = format!("{address}/v1/catalog/service/{service}");
        let nodes: Vec<CatalogService> = self.get_json(url).await?.unwrap_or_default();
        Ok(nodes
            .into_iter()
            .map(|node| BackendEndpoint {
                address: if node.service_address.is_empty() {
                    node.address
                } else {
                    node.service_address
                },
                port: node.service_port,
            })
            .collect())
    }
}

#[async_trait]
impl RegistryClient for ConsulRegistry {
    async fn list_services(&self, instance: &str) -> Result<Vec<ServiceSpec>, RegistryError> {
        let mut last_err = None;
        for address in &self.addresses {
            match self.list_from(address, instance).await {
                Ok(services) => return Ok(services),
                Err(err) => {
                    tracing::warn!(address = %address, error = %err, "registry listing failed");
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or(RegistryError::NoAddressAvailable))
    }

    async fn resolve_backends(
        &self,
        service: &str,
    ) -> Result<Vec<BackendEndpoint>, RegistryError> {
        let mut last_err = None;
        for address in &self.addresses {
            match self.resolve_from(address, service).await {
                Ok(endpoints) => return Ok(endpoints),
                Err(err) => {
                    tracing::warn!(address = %address, error = %err, "backend resolution failed");
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or(RegistryError::NoAddressAvailable))
    }

    async fn put_service(&self, instance: &str, spec: &ServiceSpec) -> Result<(), RegistryError> {
        let mut last_err = None;
        for address in &self.addresses {
            let url = Self::kv_url(address, instance, &spec.service_name);
            let result = self.client.put(&url).json(spec).send().await;
            match result {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => {
                    last_err = Some(RegistryError::Status {
                        url,
                        status: response.status(),
                    });
                }
                Err(source) => {
                    last_err = Some(RegistryError::Request { url, source });
                }
            }
        }
        Err(last_err.unwrap_or(RegistryError::NoAddressAvailable))
    }

    async fn delete_service(&self, instance: &str, service: &str) -> Result<(), RegistryError> {
        let mut last_err = None;
        for address in &self.addresses {
            let url = Self::kv_url(address, instance, service);
            let result = self.client.delete(&url).send().await;
            match result {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => {
                    last_err = Some(RegistryError::Status {
                        url,
                        status: response.status(),
                    });
                }
                Err(source) => {
                    last_err = Some(RegistryError::Request { url, source });
                }
            }
        }
        Err(last_err.unwrap_or(RegistryError::NoAddressAvailable))
    }
}
