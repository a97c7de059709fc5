//! Proxy configuration fragment generation.
//!
//! # Data Flow
//! ```text
//! ServiceSpec (+ resolved backend endpoints)
//!     → generator.rs (validation, built-in or custom templates)
//!     → Fragments { frontend, backend }
//!     → config store
//! ```
//!
//! # Design Decisions
//! - Generation is deterministic: domain ACLs before path ACLs, both in
//!   the order given, because the proxy routes on first match
//! - Custom templates use `{{FIELD}}` placeholder substitution; the
//!   template language itself is a pluggable seam behind
//!   [`TemplateFileLoader`]

pub mod generator;
pub mod loader;

use std::path::PathBuf;

use thiserror::Error;

use crate::model::ValidationError;

pub use generator::{Fragments, TemplateGenerator};
pub use loader::{FsTemplateLoader, TemplateFileLoader};

/// Failure to turn a descriptor into configuration fragments.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to read template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
