//! Reconfigure and remove orchestration.
//!
//! # Data Flow
//! ```text
//! ServiceSpec / RemoveSpec
//!     → validate
//!     → template generation (registry-resolved backends where needed)
//!     → critical section: store mutation → render → apply → reload
//!     → registry persistence (best effort)
//! ```
//!
//! # Design Decisions
//! - Store mutation, render, syntax check and reload form one critical
//!   section guarded by a single lock; at most one reload proceeds at a
//!   time and concurrent requests cannot lose each other's fragments
//! - A rejected syntax check restores the store snapshot; a failed reload
//!   does not, so the caller can retry without losing the new state
//! - Collaborators are constructor-injected capabilities, never mutable
//!   process-wide bindings

pub mod reconfigure;
pub mod remove;

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::model::ValidationError;
use crate::proxy::{ProxyController, ProxyError, ProxyProcess};
use crate::registry::RegistryError;
use crate::store::ConfigStore;
use crate::template::TemplateError;

pub use reconfigure::ReconfigureEngine;
pub use remove::RemoveEngine;

/// The per-instance state both engines mutate under one lock.
pub struct ProxyState {
    pub store: ConfigStore,
    pub controller: ProxyController,
}

impl ProxyState {
    pub fn new(process: Arc<dyn ProxyProcess>) -> Self {
        Self {
            store: ConfigStore::new(),
            controller: ProxyController::new(process),
        }
    }
}

/// Shared handle guarding the store + controller critical section.
pub type SharedProxyState = Arc<Mutex<ProxyState>>;

pub fn shared_state(process: Arc<dyn ProxyProcess>) -> SharedProxyState {
    Arc::new(Mutex::new(ProxyState::new(process)))
}

/// Failure of a reconfigure or remove operation.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Proxy(#[from] ProxyError),
}

impl ActionError {
    /// True when the request itself was malformed, as opposed to an
    /// infrastructure failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ActionError::Validation(_) | ActionError::Template(TemplateError::Validation(_))
        )
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory fakes shared by the engine unit tests.

    use std::path::Path;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::model::ServiceSpec;
    use crate::proxy::{ProxyError, ProxyProcess};
    use crate::registry::{BackendEndpoint, RegistryClient, RegistryError};
    use crate::template::{TemplateError, TemplateFileLoader};

    #[derive(Default)]
    pub struct FakeProcess {
        pub written: Mutex<Vec<String>>,
        pub checks: AtomicUsize,
        pub reloads: AtomicUsize,
        pub reject_syntax: AtomicBool,
        pub fail_reload: AtomicBool,
    }

    #[async_trait]
    impl ProxyProcess for FakeProcess {
        async fn write_config(&self, config: &str) -> Result<(), ProxyError> {
            self.written.lock().unwrap().push(config.to_string());
            Ok(())
        }

        async fn check_syntax(&self) -> Result<(), ProxyError> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            if self.reject_syntax.load(Ordering::SeqCst) {
                Err(ProxyError::InvalidConfig("unit test rejection".to_string()))
            } else {
                Ok(())
            }
        }

        async fn signal_reload(&self) -> Result<(), ProxyError> {
            if self.fail_reload.load(Ordering::SeqCst) {
                return Err(ProxyError::ReloadFailed("unit test failure".to_string()));
            }
            self.reloads.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct FakeRegistry {
        pub services: Vec<ServiceSpec>,
        pub backends: Vec<BackendEndpoint>,
        pub fail_listing: bool,
        pub puts: Mutex<Vec<String>>,
        pub deletes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RegistryClient for FakeRegistry {
        async fn list_services(
            &self,
            _instance: &str,
        ) -> Result<Vec<ServiceSpec>, RegistryError> {
            if self.fail_listing {
                Err(RegistryError::NoAddressAvailable)
            } else {
                Ok(self.services.clone())
            }
        }

        async fn resolve_backends(
            &self,
            _service: &str,
        ) -> Result<Vec<BackendEndpoint>, RegistryError> {
            Ok(self.backends.clone())
        }

        async fn put_service(
            &self,
            _instance: &str,
            spec: &ServiceSpec,
        ) -> Result<(), RegistryError> {
            self.puts.lock().unwrap().push(spec.service_name.clone());
            Ok(())
        }

        async fn delete_service(
            &self,
            _instance: &str,
            service: &str,
        ) -> Result<(), RegistryError> {
            self.deletes.lock().unwrap().push(service.to_string());
            Ok(())
        }
    }

    pub struct NoTemplates;

    #[async_trait]
    impl TemplateFileLoader for NoTemplates {
        async fn read_template(&self, path: &Path) -> Result<String, TemplateError> {
            Err(TemplateError::Read {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
    }
}
