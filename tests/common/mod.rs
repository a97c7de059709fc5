//! Shared fakes and app wiring for the control API tests.

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicBool, AtomicUsize};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;

use flow_proxy::actions::{shared_state, ReconfigureEngine, RemoveEngine, SharedProxyState};
use flow_proxy::distribute::{
    PeerCaller, PeerDistributor, PeerError, PeerRequest, PeerResolver,
};
use flow_proxy::http::{build_router, AppState, CertStore};
use flow_proxy::model::{BaseConfig, ServiceSpec};
use flow_proxy::proxy::{ProxyError, ProxyProcess};
use flow_proxy::registry::{BackendEndpoint, RegistryClient, RegistryError};
use flow_proxy::template::{FsTemplateLoader, TemplateGenerator};

use std::sync::atomic::Ordering;

#[derive(Default)]
pub struct FakeProcess {
    #[allow(dead_code)]
    pub written: Mutex<Vec<String>>,
    pub reloads: AtomicUsize,
    pub reject_syntax: AtomicBool,
}

#[async_trait]
impl ProxyProcess for FakeProcess {
    async fn write_config(&self, config: &str) -> Result<(), ProxyError> {
        self.written.lock().unwrap().push(config.to_string());
        Ok(())
    }

    async fn check_syntax(&self) -> Result<(), ProxyError> {
        if self.reject_syntax.load(Ordering::SeqCst) {
            Err(ProxyError::InvalidConfig("rejected".to_string()))
        } else {
            Ok(())
        }
    }

    async fn signal_reload(&self) -> Result<(), ProxyError> {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeRegistry {
    pub services: Vec<ServiceSpec>,
    pub backends: Vec<BackendEndpoint>,
    #[allow(dead_code)]
    pub puts: Mutex<Vec<String>>,
    pub deletes: Mutex<Vec<String>>,
}

#[async_trait]
impl RegistryClient for FakeRegistry {
    async fn list_services(&self, _instance: &str) -> Result<Vec<ServiceSpec>, RegistryError> {
        Ok(self.services.clone())
    }

    async fn resolve_backends(
        &self,
        _service: &str,
    ) -> Result<Vec<BackendEndpoint>, RegistryError> {
        Ok(self.backends.clone())
    }

    async fn put_service(&self, _instance: &str, spec: &ServiceSpec) -> Result<(), RegistryError> {
        self.puts.lock().unwrap().push(spec.service_name.clone());
        Ok(())
    }

    async fn delete_service(&self, _instance: &str, service: &str) -> Result<(), RegistryError> {
        self.deletes.lock().unwrap().push(service.to_string());
        Ok(())
    }
}

pub struct StaticResolver(pub Vec<IpAddr>);

#[async_trait]
impl PeerResolver for StaticResolver {
    async fn resolve(&self, _name: &str) -> Result<Vec<IpAddr>, io::Error> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
pub struct RecordingCaller {
    pub calls: Mutex<Vec<String>>,
    pub fail_for: Option<IpAddr>,
}

#[async_trait]
impl PeerCaller for RecordingCaller {
    async fn call(&self, peer: SocketAddr, request: &PeerRequest) -> Result<(), PeerError> {
        self.calls.lock().unwrap().push(request.url_for(peer));
        if self.fail_for == Some(peer.ip()) {
            Err(PeerError::Status {
                url: request.url_for(peer),
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            })
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
pub struct MemoryCertStore {
    pub stored: Mutex<Vec<(String, Vec<u8>)>>,
}

#[async_trait]
impl CertStore for MemoryCertStore {
    async fn put_cert(&self, name: &str, content: &[u8]) -> Result<(), io::Error> {
        self.stored
            .lock()
            .unwrap()
            .push((name.to_string(), content.to_vec()));
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub process: Arc<FakeProcess>,
    pub registry: Arc<FakeRegistry>,
    pub caller: Arc<RecordingCaller>,
    pub certs: Arc<MemoryCertStore>,
    pub state: SharedProxyState,
}

/// Wire the full control API around in-memory fakes.
pub fn build_app(
    mode: &str,
    registry: Arc<FakeRegistry>,
    caller: Arc<RecordingCaller>,
    peer_ips: Vec<IpAddr>,
) -> TestApp {
    let (router, process, certs, state) = wire_app(mode, registry.clone(), caller.clone(), peer_ips);
    TestApp {
        router,
        process,
        registry,
        caller,
        certs,
        state,
    }
}

/// Same wiring with any peer transport, for tests that dispatch the
/// fan-out into other in-memory apps.
pub fn wire_app(
    mode: &str,
    registry: Arc<FakeRegistry>,
    caller: Arc<dyn PeerCaller>,
    peer_ips: Vec<IpAddr>,
) -> (Router, Arc<FakeProcess>, Arc<MemoryCertStore>, SharedProxyState) {
    let base = BaseConfig {
        consul_addresses: vec!["http://1.2.3.4:8500".to_string()],
        instance_name: "proxy-test-instance".to_string(),
        listener_address: None,
    };
    let process = Arc::new(FakeProcess::default());
    let state = shared_state(process.clone());
    let generator = TemplateGenerator::new(Arc::new(FsTemplateLoader));
    let reconfigure = Arc::new(ReconfigureEngine::new(
        base.clone(),
        registry.clone(),
        generator,
        state.clone(),
    ));
    let remove = Arc::new(RemoveEngine::new(
        base.clone(),
        registry.clone(),
        state.clone(),
    ));
    let distributor = Arc::new(PeerDistributor::new(
        Arc::new(StaticResolver(peer_ips)),
        caller.clone(),
        "proxy".to_string(),
        8080,
    ));
    let certs = Arc::new(MemoryCertStore::default());

    let app_state = AppState {
        base,
        mode: mode.to_string(),
        reconfigure,
        remove,
        distributor,
        certs: certs.clone(),
        state: state.clone(),
        templates_path: "/tmp/tmpl".to_string(),
        configs_path: "/tmp/cfg".to_string(),
    };
    let router = build_router(app_state, Duration::from_secs(5));

    (router, process, certs, state)
}
