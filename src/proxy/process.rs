//! The haproxy process as a capability.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use crate::proxy::ProxyError;

/// Capability to write, check and reload the live proxy configuration.
#[async_trait]
pub trait ProxyProcess: Send + Sync {
    async fn write_config(&self, config: &str) -> Result<(), ProxyError>;
    async fn check_syntax(&self) -> Result<(), ProxyError>;
    async fn signal_reload(&self) -> Result<(), ProxyError>;
}

/// Drives a real haproxy binary through its command-line interface.
pub struct HaproxyProcess {
    binary: String,
    config_path: PathBuf,
    pid_path: PathBuf,
}

impl HaproxyProcess {
    /// Paths are derived from the instance name, one configuration file
    /// per proxy instance.
    pub fn new(configs_path: &str, instance_name: &str) -> Self {
        let configs = PathBuf::from(configs_path);
        Self {
            binary: "haproxy".to_string(),
            config_path: configs.join(format!("{instance_name}.cfg")),
            pid_path: configs.join(format!("{instance_name}.pid")),
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

#[async_trait]
impl ProxyProcess for HaproxyProcess {
    async fn write_config(&self, config: &str) -> Result<(), ProxyError> {
        if let Some(dir) = self.config_path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(ProxyError::Write)?;
        }
        tokio::fs::write(&self.config_path, config)
            .await
            .map_err(ProxyError::Write)
    }

    async fn check_syntax(&self) -> Result<(), ProxyError> {
        let output = Command::new(&self.binary)
            .arg("-c")
            .arg("-f")
            .arg(&self.config_path)
            .output()
            .await
            .map_err(ProxyError::Spawn)?;
        if output.status.success() {
            Ok(())
        } else {
            Err(ProxyError::InvalidConfig(
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ))
        }
    }

    async fn signal_reload(&self) -> Result<(), ProxyError> {
        let mut command = Command::new(&self.binary);
        command
            .arg("-f")
            .arg(&self.config_path)
            .arg("-p")
            .arg(&self.pid_path)
            .arg("-D");
        // Graceful reload: the old workers finish in-flight connections
        // before exiting.
        if let Ok(pids) = tokio::fs::read_to_string(&self.pid_path).await {
            let pids: Vec<&str> = pids.split_whitespace().collect();
            if !pids.is_empty() {
                command.arg("-sf").args(&pids);
            }
        }
        let output = command.output().await.map_err(ProxyError::Spawn)?;
        if output.status.success() {
            Ok(())
        } else {
            Err(ProxyError::ReloadFailed(
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ))
        }
    }
}
