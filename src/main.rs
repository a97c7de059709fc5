//! Proxy reconfiguration sidecar.
//!
//! Runs next to an HAProxy instance inside a Swarm or Compose cluster and
//! keeps its configuration in sync with the services that announce
//! themselves over the control API.
//!
//! # Architecture Overview
//!
//! ```text
//!   GET /v1/flow-proxy/reconfigure ──┐
//!   GET /v1/flow-proxy/remove ───────┤
//!                                    ▼
//!                         ┌──────────────────┐
//!                         │   http (axum)    │
//!                         └───────┬──────────┘
//!             distribute=true     │    local apply
//!          ┌──────────────────────┴───────────┐
//!          ▼                                  ▼
//!   ┌─────────────┐                   ┌──────────────┐
//!   │ distribute  │                   │   actions    │
//!   │ peer fanout │                   │   engines    │
//!   └─────────────┘                   └──┬────────┬──┘
//!                                        │        │
//!                          ┌─────────────┘        └────────────┐
//!                          ▼                                   ▼
//!                  ┌──────────────┐                    ┌──────────────┐
//!                  │   template   │                    │   registry   │
//!                  │  + store     │                    │   (consul)   │
//!                  └──────┬───────┘                    └──────────────┘
//!                         ▼
//!                  ┌──────────────┐
//!                  │    proxy     │
//!                  │ write/check/ │
//!                  │   reload     │
//!                  └──────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use flow_proxy::actions::{shared_state, ReconfigureEngine, RemoveEngine};
use flow_proxy::config::{load_config, SidecarConfig};
use flow_proxy::distribute::{DnsResolver, HttpPeerCaller, PeerDistributor};
use flow_proxy::http::{build_router, AppState, FsCertStore};
use flow_proxy::model::Mode;
use flow_proxy::observability::logging;
use flow_proxy::proxy::HaproxyProcess;
use flow_proxy::registry::ConsulRegistry;
use flow_proxy::template::{FsTemplateLoader, TemplateGenerator};

#[derive(Parser)]
#[command(name = "flow-proxy")]
#[command(about = "Proxy reconfiguration sidecar", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address override.
    #[arg(long)]
    ip: Option<String>,

    /// Bind port override.
    #[arg(long)]
    port: Option<u16>,

    /// Operating mode override: default, service or swarm.
    #[arg(long)]
    mode: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut config: SidecarConfig = load_config(args.config.as_deref())?;
    if let Some(ip) = args.ip {
        config.ip = ip;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }

    logging::init(&config.log_level);
    tracing::info!(
        mode = %config.mode,
        instance = %config.instance_name,
        registry_addresses = config.consul_addresses.len(),
        "flow-proxy starting"
    );

    let base = config.base();
    let registry = Arc::new(ConsulRegistry::new(config.consul_addresses.clone()));
    let process = Arc::new(HaproxyProcess::new(
        &config.configs_path,
        &config.instance_name,
    ));
    let state = shared_state(process);
    let generator = TemplateGenerator::new(Arc::new(FsTemplateLoader));
    let reconfigure = Arc::new(ReconfigureEngine::new(
        base.clone(),
        registry.clone(),
        generator,
        state.clone(),
    ));
    let remove = Arc::new(RemoveEngine::new(base.clone(), registry, state.clone()));

    let caller = Arc::new(HttpPeerCaller::new(Duration::from_secs(
        config.peer_timeout_secs,
    ))?);
    let distributor = Arc::new(PeerDistributor::new(
        Arc::new(DnsResolver),
        caller,
        config.proxy_service_name.clone(),
        config.peer_port,
    ));

    // Re-apply everything the registry knows before accepting requests,
    // so a restarted instance comes back with its previous routes.
    if let Err(err) = reconfigure
        .reload_all_services(
            &base.consul_addresses,
            &base.instance_name,
            Mode::parse(&config.mode),
            base.listener_address.as_deref(),
        )
        .await
    {
        tracing::error!(error = %err, "startup reconfiguration failed");
        return Err(err.into());
    }

    let app_state = AppState {
        base,
        mode: config.mode.clone(),
        reconfigure,
        remove,
        distributor,
        certs: Arc::new(FsCertStore::new(&config.certs_path)),
        state,
        templates_path: config.templates_path.clone(),
        configs_path: config.configs_path.clone(),
    };
    let router = build_router(
        app_state,
        Duration::from_secs(config.request_timeout_secs),
    );

    let listener = TcpListener::bind(config.bind_address()).await?;
    flow_proxy::http::run(router, listener).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
