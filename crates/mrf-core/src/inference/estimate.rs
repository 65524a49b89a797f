//! Smoothed-frequency re-estimation of J and mu from a latent labeling.
//!
//! Both estimators count label co-occurrences into a K×K table and add a
//! symmetric-Dirichlet pseudo-count to every cell:
//!
//! - Pairwise: every 4-connected adjacency `(p, q)` contributes once per
//!   direction, so a pair with labels `a, b` adds to both `[a, b]` and
//!   `[b, a]`. The result is symmetric.
//! - Emission: every pixel adds one to `[latent, observed]`.
//!
//! [`AffinityScale::Counts`] returns the smoothed counts as-is.
//! [`AffinityScale::LogConditional`] returns `ln` of each row normalized to a
//! probability vector; with zero smoothing, unobserved cells become `-inf`.

use mrf_common::{AffinityScale, Error, Grid, Matrix, Result};
use mrf_math::{log_predictive_probs, SymmetricDirichlet};
use tracing::debug;

use crate::logging::event_names;

fn prior_for(smoothing: f64) -> Result<SymmetricDirichlet> {
    SymmetricDirichlet::new(smoothing).ok_or_else(|| {
        Error::invalid_parameter(
            "smoothing",
            format!("must be non-negative and finite, got {smoothing}"),
        )
    })
}

fn ensure_k(k: usize) -> Result<()> {
    if k < 2 {
        return Err(Error::invalid_parameter(
            "n_colors",
            format!("need at least 2 labels, got {k}"),
        ));
    }
    Ok(())
}

/// Apply the pseudo-count and the affinity scale to a raw count table.
fn finalize(counts: &Matrix, prior: SymmetricDirichlet, scale: AffinityScale) -> Result<Matrix> {
    let k = counts.k();
    let mut rows = Vec::with_capacity(k);
    for a in 0..k {
        let smoothed = prior.posterior_counts(counts.row(a)).ok_or_else(|| {
            Error::DegenerateInput(format!("count row {a} holds a negative or NaN cell"))
        })?;
        let row = match scale {
            AffinityScale::Counts => smoothed,
            AffinityScale::LogConditional => log_predictive_probs(&smoothed)
                .unwrap_or_else(|| vec![f64::NEG_INFINITY; k]),
        };
        rows.push(row);
    }
    Matrix::from_rows(rows)
}

/// Raw directed adjacency counts of `latent`.
pub fn pairwise_counts(latent: &Grid, k: usize) -> Result<Matrix> {
    ensure_k(k)?;
    latent.validate_labels(k)?;
    let mut counts = Matrix::zeros(k);
    for row in 0..latent.rows() {
        for col in 0..latent.cols() {
            let a = latent.get(row, col);
            for b in latent.neighbors(row, col) {
                counts.add(a, b, 1.0);
            }
        }
    }
    Ok(counts)
}

/// Raw `(latent, observed)` counts.
pub fn emission_counts(latent: &Grid, observed: &Grid, k: usize) -> Result<Matrix> {
    ensure_k(k)?;
    latent.ensure_same_shape(observed, "emission estimate")?;
    latent.validate_labels(k)?;
    observed.validate_labels(k)?;
    let mut counts = Matrix::zeros(k);
    for (&a, &o) in latent.as_slice().iter().zip(observed.as_slice()) {
        counts.add(a, o, 1.0);
    }
    Ok(counts)
}

/// Re-estimate the pairwise matrix J from a latent labeling.
pub fn estimate_pairwise(
    latent: &Grid,
    k: usize,
    smoothing: f64,
    scale: AffinityScale,
) -> Result<Matrix> {
    let prior = prior_for(smoothing)?;
    let counts = pairwise_counts(latent, k)?;
    let j = finalize(&counts, prior, scale)?;
    debug!(
        event = event_names::ESTIMATE_UPDATED,
        matrix = "j",
        adjacencies = counts.as_slice().iter().sum::<f64>() / 2.0,
        %scale,
        "Re-estimated pairwise matrix"
    );
    Ok(j)
}

/// Re-estimate the emission matrix mu from a latent labeling and the noisy
/// observation it explains.
pub fn estimate_emission(
    latent: &Grid,
    observed: &Grid,
    k: usize,
    smoothing: f64,
    scale: AffinityScale,
) -> Result<Matrix> {
    let prior = prior_for(smoothing)?;
    let counts = emission_counts(latent, observed, k)?;
    let mu = finalize(&counts, prior, scale)?;
    debug!(
        event = event_names::ESTIMATE_UPDATED,
        matrix = "mu",
        pixels = latent.len(),
        %scale,
        "Re-estimated emission matrix"
    );
    Ok(mu)
}
