//! Per-pixel posterior mode over a thinned window of Gibbs samples.

use std::collections::BTreeMap;

use mrf_common::{Error, Grid, Result};
use tracing::debug;

/// Mode of `samples[burnin..]` taken every `sample_every`-th sample.
///
/// Ties go to the smallest label. Fails when the window is empty
/// (`burnin >= samples.len()`), when `sample_every` is zero, or when the
/// samples disagree on shape.
pub fn expected_image(samples: &[Grid], burnin: usize, sample_every: usize) -> Result<Grid> {
    if samples.is_empty() {
        return Err(Error::DegenerateInput("no samples to aggregate".to_string()));
    }
    if sample_every == 0 {
        return Err(Error::invalid_parameter("sample_every", "must be at least 1"));
    }
    if burnin >= samples.len() {
        return Err(Error::invalid_parameter(
            "burnin",
            format!(
                "must be less than the number of samples ({}), got {burnin}",
                samples.len()
            ),
        ));
    }

    let window: Vec<&Grid> = samples[burnin..].iter().step_by(sample_every).collect();
    let first = window[0];
    for sample in &window[1..] {
        first.ensure_same_shape(sample, "aggregated samples")?;
    }

    let mut counts: BTreeMap<usize, u32> = BTreeMap::new();
    let mut cells = Vec::with_capacity(first.len());
    for idx in 0..first.len() {
        counts.clear();
        for sample in &window {
            *counts.entry(sample.as_slice()[idx]).or_insert(0) += 1;
        }
        // Ascending iteration with a strict `>` keeps the lowest label on ties.
        let mut best = (0usize, 0u32);
        for (&label, &count) in &counts {
            if count > best.1 {
                best = (label, count);
            }
        }
        cells.push(best.0);
    }

    debug!(
        selected = window.len(),
        burnin,
        sample_every,
        "Aggregated posterior mode"
    );
    Grid::new(first.rows(), first.cols(), cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: &[usize]) -> Vec<Grid> {
        values
            .iter()
            .map(|&v| Grid::filled(1, 1, v).unwrap())
            .collect()
    }

    #[test]
    fn mode_of_mixed_pixel() {
        let samples = column(&[0, 0, 1, 0, 1]);
        assert_eq!(expected_image(&samples, 0, 1).unwrap().get(0, 0), 0);
    }

    #[test]
    fn ties_resolve_to_lowest_label() {
        let samples = column(&[2, 1, 1, 2]);
        assert_eq!(expected_image(&samples, 0, 1).unwrap().get(0, 0), 1);
    }

    #[test]
    fn burnin_and_stride_select_window() {
        // Window = indices 2, 4, 6 -> [3, 3, 0]
        let samples = column(&[0, 0, 3, 0, 3, 0, 0]);
        assert_eq!(expected_image(&samples, 2, 2).unwrap().get(0, 0), 3);
        // Window = indices 1..7 -> mostly zeros
        assert_eq!(expected_image(&samples, 1, 1).unwrap().get(0, 0), 0);
    }

    #[test]
    fn single_sample_window_is_identity() {
        let g = Grid::from_rows(vec![vec![0, 2], vec![1, 3]]).unwrap();
        let samples = vec![Grid::filled(2, 2, 0).unwrap(), g.clone()];
        assert_eq!(expected_image(&samples, 1, 1).unwrap(), g);
    }

    #[test]
    fn pixels_are_independent() {
        let a = Grid::from_rows(vec![vec![0, 1]]).unwrap();
        let b = Grid::from_rows(vec![vec![0, 0]]).unwrap();
        let c = Grid::from_rows(vec![vec![1, 1]]).unwrap();
        let out = expected_image(&[a, b, c.clone(), c], 0, 1).unwrap();
        assert_eq!(out.to_rows(), vec![vec![0, 1]]);
    }

    #[test]
    fn extreme_labels_do_not_size_the_table() {
        let samples = vec![
            Grid::filled(1, 2, usize::MAX).unwrap(),
            Grid::filled(1, 2, 1_000_000_000).unwrap(),
            Grid::filled(1, 2, usize::MAX).unwrap(),
        ];
        let out = expected_image(&samples, 0, 1).unwrap();
        assert_eq!(out.to_rows(), vec![vec![usize::MAX, usize::MAX]]);

        let tied = vec![
            Grid::filled(1, 1, usize::MAX).unwrap(),
            Grid::filled(1, 1, 1_000_000_000).unwrap(),
        ];
        assert_eq!(expected_image(&tied, 0, 1).unwrap().get(0, 0), 1_000_000_000);
    }

    #[test]
    fn rejects_burnin_past_end() {
        let samples = column(&[0, 1]);
        assert!(matches!(
            expected_image(&samples, 2, 1),
            Err(Error::InvalidParameter { name: "burnin", .. })
        ));
    }

    #[test]
    fn rejects_zero_stride() {
        let samples = column(&[0, 1]);
        assert!(matches!(
            expected_image(&samples, 0, 0),
            Err(Error::InvalidParameter {
                name: "sample_every",
                ..
            })
        ));
    }

    #[test]
    fn rejects_empty_and_mismatched() {
        assert!(matches!(
            expected_image(&[], 0, 1),
            Err(Error::DegenerateInput(_))
        ));
        let samples = vec![Grid::filled(2, 2, 0).unwrap(), Grid::filled(2, 3, 0).unwrap()];
        assert!(matches!(
            expected_image(&samples, 0, 1),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
