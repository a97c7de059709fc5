//! Configuration loading and environment merging.

use std::path::Path;

use thiserror::Error;

use crate::config::schema::SidecarConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Load configuration: optional TOML file, then environment overrides,
/// then normalization. Flag overrides are applied by the caller on top.
pub fn load_config(path: Option<&Path>) -> Result<SidecarConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => SidecarConfig::default(),
    };
    apply_env(&mut config);
    normalize(&mut config);
    Ok(config)
}

/// Environment variables keep the names the wider tooling around this
/// sidecar already uses.
fn apply_env(config: &mut SidecarConfig) {
    if let Ok(raw) = std::env::var("CONSUL_ADDRESS") {
        config.consul_addresses = raw
            .split(',')
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Ok(raw) = std::env::var("LISTENER_ADDRESS") {
        config.listener_address = if raw.is_empty() { None } else { Some(raw) };
    }
    if let Ok(raw) = std::env::var("MODE") {
        if !raw.is_empty() {
            config.mode = raw;
        }
    }
    if let Ok(raw) = std::env::var("PROXY_INSTANCE_NAME") {
        if !raw.is_empty() {
            config.instance_name = raw;
        }
    }
}

fn normalize(config: &mut SidecarConfig) {
    for address in &mut config.consul_addresses {
        *address = normalize_registry_address(address);
    }
}

/// Registry addresses are commonly given as bare `host:port`; the client
/// needs a full URL.
pub fn normalize_registry_address(address: &str) -> String {
    let trimmed = address.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_registry_address_normalization() {
        assert_eq!(
            normalize_registry_address("1.2.3.4:8500"),
            "http://1.2.3.4:8500"
        );
        assert_eq!(
            normalize_registry_address("http://consul:8500"),
            "http://consul:8500"
        );
        assert_eq!(
            normalize_registry_address("https://consul:8500"),
            "https://consul:8500"
        );
        assert_eq!(
            normalize_registry_address("  consul:8500  "),
            "http://consul:8500"
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mode = \"swarm\"").unwrap();
        writeln!(file, "consul_addresses = [\"consul:8500\"]").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.mode, "swarm");
        // File addresses are normalized on load.
        assert_eq!(config.consul_addresses, ["http://consul:8500"]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/flow-proxy.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
