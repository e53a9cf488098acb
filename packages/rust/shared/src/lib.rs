//! Shared types, error model, configuration, and heuristic tables for waybackjobs.
//!
//! This crate is the foundation depended on by all other waybackjobs crates.
//! It provides:
//! - [`WaybackJobsError`]: the unified error type
//! - Domain types ([`SnapshotDescriptor`], [`JobRecord`])
//! - Configuration ([`AppConfig`], config loading)
//! - [`heuristics`]: the fixed class-fragment/URL-pattern/roster tables

pub mod config;
pub mod error;
pub mod heuristics;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ArchiveConfig, DefaultsConfig, config_dir, config_file_path, default_date_range,
    init_config, load_config, load_config_from,
};
pub use error::{Result, WaybackJobsError};
pub use types::{JobRecord, SnapshotDescriptor};
