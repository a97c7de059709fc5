//! Control API server setup.
//!
//! # Responsibilities
//! - Create the axum Router with all control endpoints
//! - Wire up middleware (tracing, request timeout)
//! - Bind the server and serve with graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::actions::{ReconfigureEngine, RemoveEngine, SharedProxyState};
use crate::distribute::PeerDistributor;
use crate::http::certs::CertStore;
use crate::http::handlers;
use crate::model::BaseConfig;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub base: BaseConfig,
    pub mode: String,
    pub reconfigure: Arc<ReconfigureEngine>,
    pub remove: Arc<RemoveEngine>,
    pub distributor: Arc<PeerDistributor>,
    pub certs: Arc<dyn CertStore>,
    pub state: SharedProxyState,
    pub templates_path: String,
    pub configs_path: String,
}

/// Build the axum router with all endpoints and middleware layers.
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/v1/flow-proxy/reconfigure", get(handlers::reconfigure))
        .route("/v1/flow-proxy/remove", get(handlers::remove))
        .route("/v1/flow-proxy/config", get(handlers::config))
        .route("/v1/test", get(handlers::test))
        .route("/v2/test", get(handlers::test))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}

/// Serve until ctrl-c.
pub async fn run(router: Router, listener: TcpListener) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "control API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("control API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install shutdown signal handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
