//! Expectation-Maximization over latent labelings.
//!
//! Each cycle runs the Gibbs sampler from the current latent estimate under
//! the current J and mu, collapses the post-burn-in window to its per-pixel
//! mode, and re-estimates J and mu from that mode paired with the noisy grid.
//! The mode is also the recorded estimate of the cycle and the next cycle's
//! starting state. The noisy grid stays the emission evidence for the whole
//! run and is never modified.
//!
//! There is no partial-result path: any failure aborts the run.

use mrf_common::{Grid, Matrix, Result};
use mrf_config::{validate_config, DenoiseConfig};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::aggregate::expected_image;
use super::defaults::{default_j, default_mu};
use super::estimate::{estimate_emission, estimate_pairwise};
use super::gibbs::run_gibbs;
use super::potential::PotentialParams;
use crate::diagnostics::{disagreement_rate, mean_squared_error};
use crate::log_event;
use crate::logging::{event_names, LogContext, Stage};

/// Per-cycle diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleDiagnostics {
    /// Zero-based EM cycle index.
    pub cycle: usize,
    /// Fraction of pixels where the cycle's estimate differs from the noisy grid.
    pub disagreement_with_noisy: f64,
    /// Mean squared label difference between the estimate and the noisy grid.
    pub mse_vs_noisy: f64,
    /// Normalized squared deviation of the new J from the previous one.
    pub j_shift: f64,
    /// Normalized squared deviation of the new mu from the previous one.
    pub mu_shift: f64,
}

/// Everything a finished EM run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmOutcome {
    /// Denoised estimate of every cycle, in order.
    pub estimates: Vec<Grid>,
    /// Gibbs samples of the final cycle.
    pub last_samples: Vec<Grid>,
    /// Final pairwise matrix.
    pub j: Matrix,
    /// Final emission matrix.
    pub mu: Matrix,
    pub cycles: Vec<CycleDiagnostics>,
}

impl EmOutcome {
    /// Estimate of the last cycle.
    pub fn final_estimate(&self) -> Option<&Grid> {
        self.estimates.last()
    }
}

/// Drives EM cycles for one validated configuration.
#[derive(Debug, Clone)]
pub struct EmDriver {
    config: DenoiseConfig,
    ctx: LogContext,
}

impl EmDriver {
    /// Validate `config` and build a driver with a fresh run ID.
    pub fn new(config: DenoiseConfig) -> Result<Self> {
        validate_config(&config)?;
        Ok(Self {
            config,
            ctx: LogContext::generate(),
        })
    }

    /// Use an existing log context (e.g. to share the CLI's run ID).
    pub fn with_context(mut self, ctx: LogContext) -> Self {
        self.ctx = ctx;
        self
    }

    pub fn config(&self) -> &DenoiseConfig {
        &self.config
    }

    pub fn context(&self) -> &LogContext {
        &self.ctx
    }

    /// Starting parameters: configured J and mu, or the built-in defaults.
    pub fn initial_params(&self) -> Result<PotentialParams> {
        let k = self.config.n_colors;
        let j = match &self.config.j {
            Some(j) => j.clone(),
            None => default_j(k)?,
        };
        let mu = match &self.config.mu {
            Some(mu) => mu.clone(),
            None => default_mu(k)?,
        };
        PotentialParams::new(j, mu, self.config.beta)
    }

    /// Run every configured EM cycle on `noisy`.
    pub fn run<R: Rng + ?Sized>(&self, noisy: &Grid, rng: &mut R) -> Result<EmOutcome> {
        self.run_with(noisy, rng, |_| {})
    }

    /// Like [`EmDriver::run`], calling `on_cycle` after each completed cycle.
    pub fn run_with<R, F>(&self, noisy: &Grid, rng: &mut R, mut on_cycle: F) -> Result<EmOutcome>
    where
        R: Rng + ?Sized,
        F: FnMut(&CycleDiagnostics),
    {
        let cfg = &self.config;
        let k = cfg.n_colors;
        noisy.validate_labels(k)?;
        let mut params = self.initial_params()?;

        log_event!(
            self.ctx,
            INFO,
            event_names::EM_STARTED,
            Stage::Init,
            "Starting EM run",
            rows = noisy.rows(),
            cols = noisy.cols(),
            n_colors = k,
            n_em_iters = cfg.n_em_iters,
            n_gibbs_iters = cfg.n_gibbs_iters
        );

        let mut latent = noisy.clone();
        let mut estimates = Vec::with_capacity(cfg.n_em_iters);
        let mut cycles = Vec::with_capacity(cfg.n_em_iters);
        let mut last_samples = Vec::new();

        for cycle in 0..cfg.n_em_iters {
            let samples = run_gibbs(
                noisy,
                &latent,
                &params,
                cfg.n_gibbs_iters,
                cfg.sweep_order,
                rng,
            )?;
            let estimate = expected_image(&samples, cfg.burnin, cfg.sample_every)?;

            let j = estimate_pairwise(&estimate, k, cfg.smoothing, cfg.affinity_scale)?;
            let mu = estimate_emission(&estimate, noisy, k, cfg.smoothing, cfg.affinity_scale)?;

            let diagnostics = CycleDiagnostics {
                cycle,
                disagreement_with_noisy: disagreement_rate(&estimate, noisy)?,
                mse_vs_noisy: mean_squared_error(&estimate, noisy)?,
                j_shift: params.j.normalized_squared_deviation(&j)?,
                mu_shift: params.mu.normalized_squared_deviation(&mu)?,
            };
            log_event!(
                self.ctx,
                DEBUG,
                event_names::EM_CYCLE_DONE,
                Stage::Estimate,
                "EM cycle complete",
                cycle = cycle,
                disagreement = diagnostics.disagreement_with_noisy,
                j_shift = diagnostics.j_shift,
                mu_shift = diagnostics.mu_shift
            );
            on_cycle(&diagnostics);

            params = PotentialParams::new(j, mu, cfg.beta)?;
            estimates.push(estimate.clone());
            cycles.push(diagnostics);
            latent = estimate;
            last_samples = samples;
        }

        log_event!(
            self.ctx,
            INFO,
            event_names::EM_FINISHED,
            Stage::Report,
            "EM run finished",
            cycles = cycles.len()
        );

        Ok(EmOutcome {
            estimates,
            last_samples,
            j: params.j,
            mu: params.mu,
            cycles,
        })
    }
}
