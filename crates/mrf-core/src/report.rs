//! The JSON report written by `mrf-denoise run`.

use chrono::{DateTime, Utc};
use mrf_common::{Error, Grid, Matrix, Result, SCHEMA_VERSION};
use mrf_config::{ConfigSnapshot, DenoiseConfig};
use serde::{Deserialize, Serialize};

use crate::inference::{CycleDiagnostics, EmOutcome};

/// Result of one EM run, with the provenance needed to reproduce it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmReport {
    pub schema_version: String,
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    /// Seed actually used, whether supplied or drawn.
    pub seed: u64,
    /// Effective configuration after presets and overrides.
    pub config: DenoiseConfig,
    pub config_snapshot: ConfigSnapshot,
    /// Estimate of the last EM cycle.
    pub final_estimate: Grid,
    /// Estimate of every EM cycle, in order.
    pub estimates: Vec<Grid>,
    pub j: Matrix,
    pub mu: Matrix,
    pub cycles: Vec<CycleDiagnostics>,
    /// Gibbs samples of the last cycle, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_samples: Option<Vec<Grid>>,
}

impl EmReport {
    /// Assemble a report from a finished run.
    pub fn from_outcome(
        run_id: impl Into<String>,
        seed: u64,
        config: DenoiseConfig,
        config_snapshot: ConfigSnapshot,
        outcome: EmOutcome,
        include_samples: bool,
    ) -> Result<Self> {
        let final_estimate = outcome
            .final_estimate()
            .cloned()
            .ok_or_else(|| Error::DegenerateInput("EM run produced no estimates".to_string()))?;
        Ok(Self {
            schema_version: SCHEMA_VERSION.to_string(),
            run_id: run_id.into(),
            generated_at: Utc::now(),
            seed,
            config,
            config_snapshot,
            final_estimate,
            estimates: outcome.estimates,
            j: outcome.j,
            mu: outcome.mu,
            cycles: outcome.cycles,
            last_samples: include_samples.then_some(outcome.last_samples),
        })
    }

    /// One-line human summary.
    pub fn summary_line(&self) -> String {
        let (rows, cols) = self.final_estimate.shape();
        let changed = self
            .cycles
            .last()
            .map(|c| c.disagreement_with_noisy * 100.0)
            .unwrap_or(0.0);
        format!(
            "[{}] {}x{} K={} cycles={} seed={} changed={:.1}%",
            self.run_id,
            rows,
            cols,
            self.j.k(),
            self.cycles.len(),
            self.seed,
            changed
        )
    }
}
