//! Behavioral tests for the Gibbs sampler and posterior aggregation.

use mrf_common::{Grid, Matrix, SweepOrder};
use mrf_core::inference::{default_j, default_mu, expected_image, run_gibbs};
use mrf_core::PotentialParams;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn mean_label(grid: &Grid) -> f64 {
    grid.as_slice().iter().sum::<usize>() as f64 / grid.len() as f64
}

fn sticky_params() -> PotentialParams {
    // Self-affinity far above cross-affinity; observation carries no signal.
    let j = Matrix::from_rows(vec![vec![10.0, 0.0], vec![0.0, 10.0]]).unwrap();
    PotentialParams::new(j, Matrix::zeros(2), 1.0).unwrap()
}

fn default_params(k: usize) -> PotentialParams {
    PotentialParams::new(default_j(k).unwrap(), default_mu(k).unwrap(), 1.0).unwrap()
}

// ============================================================================
// Convergence
// ============================================================================

#[test]
fn strong_self_affinity_keeps_zero_majority() {
    for order in [SweepOrder::Raster, SweepOrder::Checkerboard] {
        let zeros = Grid::filled(8, 8, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(2024);
        let samples = run_gibbs(&zeros, &zeros, &sticky_params(), 20, order, &mut rng).unwrap();
        let last = samples.last().unwrap();
        assert!(mean_label(last) < 0.05, "{order}: mean {}", mean_label(last));
    }
}

#[test]
fn isolated_flip_is_smoothed_away() {
    let noisy = Grid::from_rows(vec![vec![0, 0, 0], vec![0, 1, 0], vec![0, 0, 0]]).unwrap();
    let mut rng = StdRng::seed_from_u64(17);
    let samples =
        run_gibbs(&noisy, &noisy, &default_params(2), 20, SweepOrder::Raster, &mut rng).unwrap();
    let denoised = expected_image(&samples, 5, 1).unwrap();
    assert_eq!(denoised, Grid::filled(3, 3, 0).unwrap());
}

// ============================================================================
// Ownership and reproducibility
// ============================================================================

#[test]
fn caller_grid_is_untouched_and_samples_do_not_alias() {
    let noisy = Grid::from_rows(vec![vec![0, 1, 1], vec![1, 0, 1], vec![1, 1, 0]]).unwrap();
    let initial = noisy.clone();
    let mut rng = StdRng::seed_from_u64(5);
    let mut samples =
        run_gibbs(&noisy, &initial, &default_params(2), 3, SweepOrder::Raster, &mut rng).unwrap();
    assert_eq!(initial, noisy);

    let before = samples[1].clone();
    let flipped = 1 - samples[0].get(1, 1);
    samples[0].set(1, 1, flipped);
    assert_eq!(samples[1], before);
}

#[test]
fn fixed_seed_reproduces_chain() {
    let noisy = Grid::from_rows(vec![
        vec![0, 1, 2, 3],
        vec![3, 2, 1, 0],
        vec![0, 0, 3, 3],
    ])
    .unwrap();
    for order in [SweepOrder::Raster, SweepOrder::Checkerboard] {
        let chain = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            run_gibbs(&noisy, &noisy, &default_params(4), 6, order, &mut rng).unwrap()
        };
        assert_eq!(chain(99), chain(99), "{order}");
    }
}

#[test]
fn one_by_one_grid_uses_emission_only() {
    // No neighbors: with a decisive mu the pixel follows its observation.
    let mu = Matrix::from_rows(vec![vec![20.0, 0.0], vec![0.0, 20.0]]).unwrap();
    let params = PotentialParams::new(default_j(2).unwrap(), mu, 1.0).unwrap();
    let observed = Grid::filled(1, 1, 1).unwrap();
    let initial = Grid::filled(1, 1, 0).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let samples =
        run_gibbs(&observed, &initial, &params, 5, SweepOrder::Raster, &mut rng).unwrap();
    assert!(samples.iter().all(|s| s.get(0, 0) == 1));
}
