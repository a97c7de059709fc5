//! Control API subsystem.
//!
//! # Data Flow
//! ```text
//! GET /v1/flow-proxy/reconfigure?serviceName=...
//!     → params.rs (query → ServiceSpec)
//!     → handlers.rs (validate, certs, distribute-or-apply)
//!     → actions engines / distribute fan-out
//!     → JSON echo of the accepted descriptor
//! ```

pub mod certs;
pub mod handlers;
pub mod params;
pub mod server;

pub use certs::{CertStore, FsCertStore};
pub use params::{ReconfigureParams, RemoveParams};
pub use server::{build_router, run, AppState};
