//! Service removal engine.

use std::sync::Arc;

use crate::actions::{ActionError, SharedProxyState};
use crate::model::{BaseConfig, RemoveSpec, ValidationError};
use crate::observability::metrics;
use crate::registry::RegistryClient;

/// Drops a service's fragments from the store and reloads the proxy.
pub struct RemoveEngine {
    base: BaseConfig,
    registry: Arc<dyn RegistryClient>,
    state: SharedProxyState,
}

impl RemoveEngine {
    pub fn new(
        base: BaseConfig,
        registry: Arc<dyn RegistryClient>,
        state: SharedProxyState,
    ) -> Self {
        Self {
            base,
            registry,
            state,
        }
    }

    /// Remove one service. Removing a name that was never configured is
    /// not an error; the proxy still reloads so the caller observes a
    /// consistent "service absent" outcome either way.
    pub async fn execute(&self, spec: &RemoveSpec) -> Result<(), ActionError> {
        if spec.service_name.is_empty() {
            return Err(ValidationError::MissingServiceName.into());
        }

        {
            let mut state = self.state.lock().await;
            let snapshot = state.store.snapshot();
            let removed = state.store.remove(&spec.service_name);
            if !removed {
                tracing::debug!(service = %spec.service_name, "service was not configured");
            }
            let rendered = state.store.render();
            if let Err(err) = state.controller.apply(&rendered).await {
                state.store.restore(snapshot);
                metrics::record_reload_failure("syntax");
                return Err(err.into());
            }
            if let Err(err) = state.controller.reload().await {
                metrics::record_reload_failure("reload");
                return Err(err.into());
            }
        }
        metrics::record_reload();

        self.unpersist(&spec.service_name).await;
        tracing::info!(service = %spec.service_name, "service removed");
        Ok(())
    }

    /// Best effort, mirroring descriptor persistence on reconfigure: the
    /// proxy already runs without the service, so a registry failure is
    /// logged rather than surfaced.
    async fn unpersist(&self, service: &str) {
        if self.base.consul_addresses.is_empty() {
            return;
        }
        if let Err(err) = self
            .registry
            .delete_service(&self.base.instance_name, service)
            .await
        {
            tracing::warn!(
                service = %service,
                error = %err,
                "failed to delete service descriptor from registry"
            );
        }
    }
}
