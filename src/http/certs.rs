//! Inline certificate storage.
//!
//! A reconfigure request may carry a PEM bundle for its domain; the proxy
//! expects it on disk before the reload picks it up.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;

/// Capability to persist a certificate under a name.
#[async_trait]
pub trait CertStore: Send + Sync {
    async fn put_cert(&self, name: &str, content: &[u8]) -> Result<(), io::Error>;
}

/// Writes certificates as `{dir}/{name}.pem`.
pub struct FsCertStore {
    dir: PathBuf,
}

impl FsCertStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl CertStore for FsCertStore {
    async fn put_cert(&self, name: &str, content: &[u8]) -> Result<(), io::Error> {
        let path = self.dir.join(format!("{name}.pem"));
        tokio::fs::write(&path, content).await?;
        tracing::info!(path = %path.display(), "certificate stored");
        Ok(())
    }
}
