//! Typed run configuration.
//!
//! Every field has a default, so `{}` is a valid config file. Defaults match a
//! small interactive run: binary labels, 5 EM cycles of 5 Gibbs sweeps each,
//! burn-in 2, no thinning.

use mrf_common::{AffinityScale, Matrix, SweepOrder};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::validate::{ValidationError, ValidationResult};

/// Configuration surface of an EM denoising run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DenoiseConfig {
    /// Schema version of this file.
    pub schema_version: String,

    /// Number of discrete labels K.
    pub n_colors: usize,

    /// Number of EM cycles.
    pub n_em_iters: usize,

    /// Gibbs sweeps per EM cycle.
    pub n_gibbs_iters: usize,

    /// Leading sweeps discarded before aggregation.
    pub burnin: usize,

    /// Thinning stride over post-burn-in sweeps.
    pub sample_every: usize,

    /// Inverse temperature.
    pub beta: f64,

    /// Pseudo-count added to every co-occurrence cell when re-estimating.
    pub smoothing: f64,

    /// Seed for the run's random source. A fresh seed is drawn when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Pixel visitation order within a sweep.
    pub sweep_order: SweepOrder,

    /// Count-to-affinity convention of the estimator.
    pub affinity_scale: AffinityScale,

    /// Initial pairwise matrix. Built-in default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub j: Option<Matrix>,

    /// Initial emission matrix. Built-in default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mu: Option<Matrix>,
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            n_colors: 2,
            n_em_iters: 5,
            n_gibbs_iters: 5,
            burnin: 2,
            sample_every: 1,
            beta: 1.0,
            smoothing: 1.0,
            seed: None,
            sweep_order: SweepOrder::Raster,
            affinity_scale: AffinityScale::Counts,
            j: None,
            mu: None,
        }
    }
}

impl DenoiseConfig {
    /// Parse a config from JSON text. Does not validate semantics.
    pub fn from_json_str(json: &str) -> ValidationResult<Self> {
        serde_json::from_str(json).map_err(|e| ValidationError::ParseError(e.to_string()))
    }

    /// Serialize as pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Number of Gibbs samples that survive burn-in and thinning.
    ///
    /// Zero when the burn-in consumes every sweep.
    pub fn retained_samples(&self) -> usize {
        if self.sample_every == 0 || self.burnin >= self.n_gibbs_iters {
            return 0;
        }
        (self.n_gibbs_iters - self.burnin).div_ceil(self.sample_every)
    }
}
