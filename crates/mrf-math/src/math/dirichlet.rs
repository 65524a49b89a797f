//! Symmetric-Dirichlet smoothing for categorical count vectors.
//!
//! The parameter estimator turns raw co-occurrence counts into affinities.
//! Adding a pseudo-count to every cell is the MAP/posterior-mean update under
//! a symmetric Dirichlet prior:
//!
//! - Prior: `p = (p_1..p_K) ~ Dirichlet(α, .., α)`
//! - Likelihood: `n = (n_1..n_K) | p ~ Multinomial(N, p)`
//! - Posterior: `p | n ~ Dirichlet(α + n_i)`
//!
//! With `α = 1` this is Laplace smoothing. `α = 0` is allowed and yields the
//! raw maximum-likelihood counts, so unobserved cells stay at zero.

/// Symmetric Dirichlet prior described by a single pseudo-count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetricDirichlet {
    /// Pseudo-count added to every category (non-negative, finite).
    pub pseudo_count: f64,
}

impl SymmetricDirichlet {
    /// Create a prior with validation.
    ///
    /// Returns None if the pseudo-count is negative, NaN, or infinite.
    pub fn new(pseudo_count: f64) -> Option<Self> {
        if !pseudo_count.is_finite() || pseudo_count < 0.0 {
            return None;
        }
        Some(Self { pseudo_count })
    }

    /// Posterior concentration `α + n_i` for every category.
    ///
    /// Returns None if any count is negative or NaN.
    pub fn posterior_counts(&self, counts: &[f64]) -> Option<Vec<f64>> {
        if counts.iter().any(|c| c.is_nan() || *c < 0.0) {
            return None;
        }
        Some(counts.iter().map(|&n| n + self.pseudo_count).collect())
    }
}

/// Log predictive probabilities `ln(α'_i) - ln(Σ_j α'_j)`.
///
/// Zero-concentration categories map to -inf. Returns None when the total
/// concentration is zero.
pub fn log_predictive_probs(posterior: &[f64]) -> Option<Vec<f64>> {
    let total: f64 = posterior.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }
    let log_total = total.ln();
    Some(
        posterior
            .iter()
            .map(|&a| {
                if a <= 0.0 {
                    f64::NEG_INFINITY
                } else {
                    a.ln() - log_total
                }
            })
            .collect(),
    )
}
