//! Process configuration subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (CONSUL_ADDRESS, MODE, ...)
//!     → address normalization
//!     → flag overrides applied in main
//!     → SidecarConfig (immutable for the process lifetime)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so the sidecar runs with no file at all
//! - Environment variable names match the deployment tooling, not Rust
//!   conventions

pub mod loader;
pub mod schema;

pub use loader::{load_config, normalize_registry_address, ConfigError};
pub use schema::SidecarConfig;
