//! Service reconfiguration engine.

use std::sync::Arc;

use crate::actions::{ActionError, SharedProxyState};
use crate::model::{BaseConfig, Mode, ServiceSpec};
use crate::observability::metrics;
use crate::registry::{BackendEndpoint, RegistryClient};
use crate::template::{Fragments, TemplateGenerator};

/// Orchestrates descriptor validation, fragment generation, store merge
/// and proxy reload for one service at a time, plus the bulk
/// reapply-everything path used at startup and peer recovery.
pub struct ReconfigureEngine {
    base: BaseConfig,
    registry: Arc<dyn RegistryClient>,
    generator: TemplateGenerator,
    state: SharedProxyState,
}

impl ReconfigureEngine {
    pub fn new(
        base: BaseConfig,
        registry: Arc<dyn RegistryClient>,
        generator: TemplateGenerator,
        state: SharedProxyState,
    ) -> Self {
        Self {
            base,
            registry,
            generator,
            state,
        }
    }

    /// Apply one service descriptor: validate, generate fragments, merge
    /// into the store and reload the proxy. Any failure short-circuits;
    /// a rejected syntax check leaves no trace in the store.
    pub async fn execute(&self, spec: &ServiceSpec) -> Result<(), ActionError> {
        spec.validate()?;
        let backends = self.resolve_backends(spec).await?;
        let fragments = self.generator.generate(spec, &backends).await?;

        {
            let mut state = self.state.lock().await;
            let snapshot = state.store.snapshot();
            state.store.upsert(&spec.service_name, fragments);
            let rendered = state.store.render();
            if let Err(err) = state.controller.apply(&rendered).await {
                state.store.restore(snapshot);
                metrics::record_reload_failure("syntax");
                return Err(err.into());
            }
            // A failed reload keeps the new store content so the caller
            // can retry the same request.
            if let Err(err) = state.controller.reload().await {
                metrics::record_reload_failure("reload");
                return Err(err.into());
            }
        }
        metrics::record_reload();

        self.persist(spec).await;
        tracing::info!(service = %spec.service_name, "service reconfigured");
        Ok(())
    }

    /// Reapply every service registered for this instance, with exactly
    /// one syntax check and reload at the end.
    ///
    /// Skipped in swarm mode without registry addresses: backend
    /// membership is then resolved lazily at reload time, so there is
    /// nothing to enumerate.
    pub async fn reload_all_services(
        &self,
        addresses: &[String],
        instance_name: &str,
        mode: Mode,
        listener_address: Option<&str>,
    ) -> Result<(), ActionError> {
        if mode.is_swarm() && addresses.is_empty() {
            tracing::debug!("no registry configured; skipping bulk service reload");
            return Ok(());
        }

        // A registry failure aborts the whole bulk pass before any
        // store mutation.
        let services = self.registry.list_services(instance_name).await?;
        tracing::info!(count = services.len(), "reapplying registered services");

        let mut prepared: Vec<(String, Fragments)> = Vec::with_capacity(services.len());
        for spec in &services {
            let backends = self.resolve_backends_with(spec, listener_address).await?;
            let fragments = self.generator.generate(spec, &backends).await?;
            prepared.push((spec.service_name.clone(), fragments));
        }

        let mut state = self.state.lock().await;
        let snapshot = state.store.snapshot();
        for (name, fragments) in prepared {
            state.store.upsert(&name, fragments);
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
        metrics::record_reload();
        Ok(())
    }

    /// Generate fragments without touching the store, for dry-run and
    /// inspection callers.
    pub async fn get_templates(&self, spec: &ServiceSpec) -> Result<Fragments, ActionError> {
        spec.validate()?;
        let backends = self.resolve_backends(spec).await?;
        Ok(self.generator.generate(spec, &backends).await?)
    }

    /// Pick the backend-resolution path for a descriptor.
    ///
    /// Swarm-mode backends are normally resolved by the proxy itself at
    /// reload time; an orchestrator listener switches them back to
    /// registry resolution. Default mode always asks the registry when
    /// one is configured.
    async fn resolve_backends(
        &self,
        spec: &ServiceSpec,
    ) -> Result<Vec<BackendEndpoint>, ActionError> {
        self.resolve_backends_with(spec, self.base.listener_address.as_deref())
            .await
    }

    async fn resolve_backends_with(
        &self,
        spec: &ServiceSpec,
        listener_address: Option<&str>,
    ) -> Result<Vec<BackendEndpoint>, ActionError> {
        if spec.parsed_mode().is_swarm() && listener_address.is_none() {
            return Ok(Vec::new());
        }
        if self.base.consul_addresses.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.registry.resolve_backends(&spec.service_name).await?)
    }

    /// Best effort: a registry write failure after a successful reload is
    /// logged, not surfaced, since the proxy already runs the new config.
    async fn persist(&self, spec: &ServiceSpec) {
        if self.base.consul_addresses.is_empty() {
            return;
        }
        if let Err(err) = self
            .registry
            .put_service(&self.base.instance_name, spec)
            .await
        {
            tracing::warn!(
                service = %spec.service_name,
                error = %err,
                "failed to persist service descriptor to registry"
            );
        }
    }
}
