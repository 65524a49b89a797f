//! Gibbs conditionals of a pairwise MRF over a 4-connected lattice.
//!
//! For a pixel at `(row, col)` observing `o`, candidate label `s` has energy
//!
//! ```text
//! E(s) = beta * ( Σ_{n ∈ N(row, col)} J[s, n] + mu[s, o] )
//! ```
//!
//! where `N` is the set of existing up/left/down/right neighbors (2 at a
//! corner, 3 on an edge, 4 inside). The conditional is `exp(E(s)) / Σ exp(E)`,
//! computed in the log domain so count-valued affinities cannot overflow.
//! K = 2 is the Ising model and K > 2 the Potts model; both go through the
//! same code.

use mrf_common::{Error, Grid, Matrix, Result};
use mrf_math::softmax;
use serde::{Deserialize, Serialize};

/// The pairwise matrix, emission matrix and inverse temperature of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotentialParams {
    pub j: Matrix,
    pub mu: Matrix,
    pub beta: f64,
}

impl PotentialParams {
    /// Validate and bundle parameters.
    ///
    /// Requires `j` and `mu` to share one K ≥ 2, no NaN or +inf cells, and a
    /// positive finite `beta`.
    pub fn new(j: Matrix, mu: Matrix, beta: f64) -> Result<Self> {
        if j.k() < 2 {
            return Err(Error::invalid_parameter(
                "n_colors",
                format!("need at least 2 labels, got {}", j.k()),
            ));
        }
        mu.ensure_k(j.k(), "mu")?;
        j.ensure_usable("j")?;
        mu.ensure_usable("mu")?;
        if !beta.is_finite() || beta <= 0.0 {
            return Err(Error::invalid_parameter(
                "beta",
                format!("must be positive and finite, got {beta}"),
            ));
        }
        Ok(Self { j, mu, beta })
    }

    /// Number of labels.
    #[inline]
    pub fn k(&self) -> usize {
        self.j.k()
    }
}

/// Labels of the existing lattice neighbors of `(row, col)`, in the order
/// up, left, down, right.
pub fn neighbors(grid: &Grid, row: usize, col: usize) -> Vec<usize> {
    grid.neighbors(row, col).collect()
}

/// Conditional distribution over the K labels at `(row, col)`.
///
/// Fails fast on out-of-bounds coordinates and on an observed or neighbor
/// label outside `[0, K)`.
pub fn conditional_distribution(
    grid: &Grid,
    row: usize,
    col: usize,
    observed: usize,
    params: &PotentialParams,
) -> Result<Vec<f64>> {
    let k = params.k();
    if row >= grid.rows() || col >= grid.cols() {
        return Err(Error::invalid_parameter(
            "position",
            format!(
                "({row}, {col}) is outside a {}x{} grid",
                grid.rows(),
                grid.cols()
            ),
        ));
    }
    if observed >= k {
        return Err(Error::OutOfRangeValue {
            row,
            col,
            value: observed,
            k,
        });
    }
    for (r, c) in grid.neighbor_coords(row, col) {
        let value = grid.get(r, c);
        if value >= k {
            return Err(Error::OutOfRangeValue { row: r, col: c, value, k });
        }
    }
    conditional_unchecked(grid, row, col, observed, params)
}

/// Conditional without range checks. Callers guarantee that the grid and
/// `observed` hold labels in `[0, K)`.
pub(crate) fn conditional_unchecked(
    grid: &Grid,
    row: usize,
    col: usize,
    observed: usize,
    params: &PotentialParams,
) -> Result<Vec<f64>> {
    let k = params.k();
    let mut energies = vec![0.0; k];
    for n in grid.neighbors(row, col) {
        for (s, e) in energies.iter_mut().enumerate() {
            *e += params.j.get(s, n);
        }
    }
    for (s, e) in energies.iter_mut().enumerate() {
        *e += params.mu.get(s, observed);
    }
    softmax(&energies, params.beta).ok_or_else(|| {
        Error::DegenerateInput(format!(
            "every label has zero weight at ({row}, {col}); J or mu forbids all of them"
        ))
    })
}
