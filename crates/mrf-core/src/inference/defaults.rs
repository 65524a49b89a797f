//! Built-in starting matrices.
//!
//! `J[a,b] = 1 - 2|a-b|/(K-1)` rewards equal neighbors and decays linearly
//! with label distance, down to -1 for the two extreme labels. `mu[a,o]` is
//! +1 on the diagonal and -1 elsewhere. For K = 2 both reduce to the Ising
//! coupling `[[1,-1],[-1,1]]`.

use mrf_common::{Error, Matrix, Result};

fn ensure_k(k: usize) -> Result<()> {
    if k < 2 {
        return Err(Error::invalid_parameter(
            "n_colors",
            format!("need at least 2 labels, got {k}"),
        ));
    }
    Ok(())
}

/// Default pairwise matrix for `k` labels.
pub fn default_j(k: usize) -> Result<Matrix> {
    ensure_k(k)?;
    let span = (k - 1) as f64;
    Ok(Matrix::from_fn(k, |a, b| {
        1.0 - 2.0 * a.abs_diff(b) as f64 / span
    }))
}

/// Default emission matrix for `k` labels.
pub fn default_mu(k: usize) -> Result<Matrix> {
    ensure_k(k)?;
    Ok(Matrix::from_fn(k, |a, o| if a == o { 1.0 } else { -1.0 }))
}
