//! Configuration schema definitions.
//!
//! All fields have defaults so a sidecar can start with no config file at
//! all and be driven entirely by environment variables and flags.

use serde::{Deserialize, Serialize};

use crate::model::BaseConfig;

/// Root configuration for the sidecar.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SidecarConfig {
    /// Bind address for the control API.
    pub ip: String,

    /// Bind port for the control API.
    pub port: u16,

    /// Operating mode: "default", "service" or "swarm".
    pub mode: String,

    /// Name of this proxy instance; scopes config file names and registry
    /// keys so several instances can share a registry.
    pub instance_name: String,

    /// Registry endpoints, tried in order.
    pub consul_addresses: Vec<String>,

    /// Orchestrator listener address, when one runs alongside.
    pub listener_address: Option<String>,

    /// Directory the rendered proxy configuration is written to.
    pub configs_path: String,

    /// Directory custom template overrides are read from.
    pub templates_path: String,

    /// Directory inline certificates are written to.
    pub certs_path: String,

    /// Service name the sidecar replicas are deployed under; peer
    /// discovery resolves it through DNS.
    pub proxy_service_name: String,

    /// Control API port on peer replicas.
    pub peer_port: u16,

    /// Per-peer request timeout during fan-out.
    pub peer_timeout_secs: u64,

    /// Control API request timeout.
    pub request_timeout_secs: u64,

    /// Default log filter, overridable through `RUST_LOG`.
    pub log_level: String,
}

impl Default for SidecarConfig {
    fn default() -> Self {
        Self {
            ip: "0.0.0.0".to_string(),
            port: 8080,
            mode: "default".to_string(),
            instance_name: "docker-flow".to_string(),
            consul_addresses: Vec::new(),
            listener_address: None,
            configs_path: "/cfg".to_string(),
            templates_path: "/cfg/tmpl".to_string(),
            certs_path: "/certs".to_string(),
            proxy_service_name: "proxy".to_string(),
            peer_port: 8080,
            peer_timeout_secs: 5,
            request_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

impl SidecarConfig {
    /// The cluster-wide subset shared with the engines.
    pub fn base(&self) -> BaseConfig {
        BaseConfig {
            consul_addresses: self.consul_addresses.clone(),
            instance_name: self.instance_name.clone(),
            listener_address: self.listener_address.clone(),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_allow_empty_config() {
        let config: SidecarConfig = toml::from_str("").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.mode, "default");
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert!(config.consul_addresses.is_empty());
    }

    #[test]
    fn test_partial_file_overrides_defaults() {
        let config: SidecarConfig = toml::from_str(
            r#"
            mode = "swarm"
            port = 9090
            consul_addresses = ["http://consul:8500"]
            "#,
        )
        .unwrap();
        assert_eq!(config.mode, "swarm");
        assert_eq!(config.port, 9090);
        assert_eq!(config.consul_addresses, ["http://consul:8500"]);
        assert_eq!(config.instance_name, "docker-flow");
    }
}
