//! MRF denoising run configuration.
//!
//! This crate provides:
//! - The typed `DenoiseConfig` with serde defaults
//! - Named presets for iteration budgets
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation
//! - Config snapshots for run provenance

pub mod preset;
pub mod resolve;
pub mod settings;
pub mod snapshot;
pub mod validate;

pub use preset::PresetName;
pub use resolve::{load_config, resolve_config, ConfigPath, ConfigSource, LoadedConfig};
pub use settings::DenoiseConfig;
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_config, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
