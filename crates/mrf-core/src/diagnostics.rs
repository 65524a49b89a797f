//! Scalar comparisons between label grids.
//!
//! Used for per-cycle EM diagnostics and for measuring denoising quality
//! against a clean reference when one is available.

use mrf_common::{Grid, Result};

/// Mean of the squared per-pixel label difference.
pub fn mean_squared_error(a: &Grid, b: &Grid) -> Result<f64> {
    a.ensure_same_shape(b, "mean squared error")?;
    let total: f64 = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum();
    Ok(total / a.len() as f64)
}

/// Fraction of pixels whose labels differ.
pub fn disagreement_rate(a: &Grid, b: &Grid) -> Result<f64> {
    a.ensure_same_shape(b, "disagreement rate")?;
    let differing = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .filter(|(x, y)| x != y)
        .count();
    Ok(differing as f64 / a.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrf_common::Error;

    #[test]
    fn identical_grids_score_zero() {
        let g = Grid::from_rows(vec![vec![0, 3], vec![2, 1]]).unwrap();
        assert_eq!(mean_squared_error(&g, &g).unwrap(), 0.0);
        assert_eq!(disagreement_rate(&g, &g).unwrap(), 0.0);
    }

    #[test]
    fn mse_weights_label_distance() {
        let a = Grid::from_rows(vec![vec![0, 0], vec![0, 0]]).unwrap();
        let b = Grid::from_rows(vec![vec![3, 0], vec![1, 0]]).unwrap();
        // (9 + 1) / 4
        assert_eq!(mean_squared_error(&a, &b).unwrap(), 2.5);
        assert_eq!(disagreement_rate(&a, &b).unwrap(), 0.5);
    }

    #[test]
    fn rejects_mismatched_shapes() {
        let a = Grid::filled(2, 2, 0).unwrap();
        let b = Grid::filled(1, 4, 0).unwrap();
        assert!(matches!(
            mean_squared_error(&a, &b),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(disagreement_rate(&a, &b).is_err());
    }
}
