//! Proxy reconfiguration sidecar library.

pub mod actions;
pub mod config;
pub mod distribute;
pub mod http;
pub mod model;
pub mod observability;
pub mod proxy;
pub mod registry;
pub mod store;
pub mod template;

pub use actions::{ReconfigureEngine, RemoveEngine};
pub use config::SidecarConfig;
pub use http::AppState;
pub use model::{RemoveSpec, ServiceSpec};
