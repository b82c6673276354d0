//! Persistence layer of the Banter chat widget.
//!
//! File-backed implementations of the core interfaces: the single-slot
//! crash-recovery backup, configuration/secrets loading, and platform path
//! resolution.

pub mod config_service;
pub mod json_backup_repository;
pub mod paths;

pub use config_service::{SecretStore, load_default_widget_config, load_widget_config};
pub use json_backup_repository::JsonBackupRepository;
pub use paths::BanterPaths;
