//! Data model for reconfigure and remove operations.
//!
//! # Data Flow
//! ```text
//! HTTP query parameters / registry KV entries
//!     → ServiceSpec (per-request, owned by one operation)
//!     → validate() (rejects before any side effect)
//!     → template generation, config store, registry persistence
//!
//! BaseConfig is built once from process configuration and shared
//! read-only with every request.
//! ```
//!
//! # Design Decisions
//! - Mode and path type arrive as free-form strings and are folded to
//!   enums case-insensitively at this boundary; the raw strings are kept
//!   so responses echo exactly what the caller sent
//! - Validation is a pure function on the spec, run before any mutation

pub mod remove;
pub mod service;

pub use remove::RemoveSpec;
pub use service::{BaseConfig, Mode, PathType, ServiceSpec, User, ValidationError};
