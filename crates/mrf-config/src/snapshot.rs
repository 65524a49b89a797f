//! Configuration snapshots for run provenance.
//!
//! A snapshot captures the exact configuration state at the start of a run,
//! so a report can be traced back to the file and values that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::resolve::{ConfigPath, ConfigSource};
use crate::settings::DenoiseConfig;

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// SHA-256 hash of the config file content.
    #[serde(default)]
    pub file_hash: Option<String>,

    /// Path where the config was loaded from.
    #[serde(default)]
    pub config_path: Option<String>,

    /// Source of the configuration.
    pub config_source: String,

    /// SHA-256 hash of the effective configuration (after overrides).
    pub effective_hash: String,

    /// Key configuration values for quick reference.
    pub summary: ConfigSummary,
}

/// Summary of key configuration values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub n_colors: usize,
    pub n_em_iters: usize,
    pub n_gibbs_iters: usize,
    pub burnin: usize,
    pub sample_every: usize,
    pub beta: f64,
    pub smoothing: f64,
    pub sweep_order: String,
    pub affinity_scale: String,
    /// Whether J was supplied rather than defaulted.
    pub custom_j: bool,
    /// Whether mu was supplied rather than defaulted.
    pub custom_mu: bool,
}

impl ConfigSnapshot {
    /// Create a new snapshot from a loaded configuration.
    pub fn new(config: &DenoiseConfig, resolved: &ConfigPath, raw_json: Option<&str>) -> Self {
        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            file_hash: raw_json.map(hash_content),
            config_path: resolved.path.as_ref().map(|p| p.display().to_string()),
            config_source: resolved.source.to_string(),
            effective_hash: effective_hash(config),
            summary: ConfigSummary::from_config(config),
        }
    }

    /// Create a snapshot with only defaults (no config file loaded).
    pub fn defaults_only(config: &DenoiseConfig) -> Self {
        Self::new(
            config,
            &ConfigPath {
                path: None,
                source: ConfigSource::BuiltinDefault,
            },
            None,
        )
    }

    /// Re-derive the effective hash and summary after CLI overrides.
    pub fn refresh(&mut self, config: &DenoiseConfig) {
        self.effective_hash = effective_hash(config);
        self.summary = ConfigSummary::from_config(config);
    }

    /// Serialize snapshot to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check if this snapshot matches another (same effective config).
    pub fn matches(&self, other: &ConfigSnapshot) -> bool {
        self.effective_hash == other.effective_hash
    }

    /// Get a short identifier for this snapshot (first 12 chars of hash).
    pub fn short_id(&self) -> &str {
        &self.effective_hash[..12.min(self.effective_hash.len())]
    }
}

impl ConfigSummary {
    fn from_config(config: &DenoiseConfig) -> Self {
        ConfigSummary {
            n_colors: config.n_colors,
            n_em_iters: config.n_em_iters,
            n_gibbs_iters: config.n_gibbs_iters,
            burnin: config.burnin,
            sample_every: config.sample_every,
            beta: config.beta,
            smoothing: config.smoothing,
            sweep_order: config.sweep_order.to_string(),
            affinity_scale: config.affinity_scale.to_string(),
            custom_j: config.j.is_some(),
            custom_mu: config.mu.is_some(),
        }
    }
}

fn effective_hash(config: &DenoiseConfig) -> String {
    let canonical = serde_json::to_string(config).unwrap_or_default();
    hash_content(&canonical)
}

/// Hash content with SHA-256 and return hex string.
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
