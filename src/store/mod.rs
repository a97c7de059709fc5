//! In-memory master configuration.
//!
//! # Design Decisions
//! - Fragments keep first-insertion order; re-upserting a service changes
//!   its content but never its position, so renders stay stable
//! - `render` is pure: it never touches disk and never triggers a reload
//! - Snapshot/restore exists so a failed syntax check can roll the store
//!   back without partial state

pub mod config_store;

pub use config_store::{ConfigStore, Snapshot};
