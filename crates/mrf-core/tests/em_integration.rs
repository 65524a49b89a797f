//! EM driver acceptance tests.

use mrf_common::{AffinityScale, Grid, SweepOrder};
use mrf_config::DenoiseConfig;
use mrf_core::inference::{default_j, default_mu};
use mrf_core::EmDriver;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_grid(rows: usize, cols: usize, k: usize, seed: u64) -> Grid {
    let mut rng = StdRng::seed_from_u64(seed);
    let cells = (0..rows * cols).map(|_| rng.random_range(0..k)).collect();
    Grid::new(rows, cols, cells).unwrap()
}

fn ten_cycle_config(scale: AffinityScale) -> DenoiseConfig {
    DenoiseConfig {
        n_em_iters: 10,
        affinity_scale: scale,
        ..DenoiseConfig::default()
    }
}

#[test]
fn parameters_move_away_from_defaults() {
    for scale in [AffinityScale::Counts, AffinityScale::LogConditional] {
        let noisy = random_grid(10, 10, 2, 1);
        let driver = EmDriver::new(ten_cycle_config(scale)).unwrap();
        let mut rng = StdRng::seed_from_u64(31);
        let outcome = driver.run(&noisy, &mut rng).unwrap();

        let j_dev = default_j(2)
            .unwrap()
            .normalized_squared_deviation(&outcome.j)
            .unwrap();
        let mu_dev = default_mu(2)
            .unwrap()
            .normalized_squared_deviation(&outcome.mu)
            .unwrap();
        assert!(j_dev > 0.1, "{scale}: J deviation {j_dev}");
        assert!(mu_dev > 0.1, "{scale}: mu deviation {mu_dev}");
    }
}

#[test]
fn ten_cycles_yield_ten_estimates() {
    let noisy = random_grid(10, 10, 2, 2);
    let original = noisy.clone();
    let driver = EmDriver::new(ten_cycle_config(AffinityScale::Counts)).unwrap();
    let mut rng = StdRng::seed_from_u64(32);
    let outcome = driver.run(&noisy, &mut rng).unwrap();

    assert_eq!(outcome.estimates.len(), 10);
    assert_eq!(outcome.cycles.len(), 10);
    assert_eq!(outcome.last_samples.len(), driver.config().n_gibbs_iters);
    for (i, cycle) in outcome.cycles.iter().enumerate() {
        assert_eq!(cycle.cycle, i);
        assert!((0.0..=1.0).contains(&cycle.disagreement_with_noisy));
        assert!(cycle.mse_vs_noisy.is_finite());
        assert!(cycle.j_shift.is_finite());
        assert!(cycle.mu_shift.is_finite());
    }
    for estimate in &outcome.estimates {
        assert!(estimate.validate_labels(2).is_ok());
    }
    assert_eq!(noisy, original);
}

#[test]
fn potts_run_with_checkerboard_is_reproducible() {
    let noisy = random_grid(9, 11, 4, 3);
    let config = DenoiseConfig {
        n_colors: 4,
        n_em_iters: 4,
        n_gibbs_iters: 6,
        burnin: 2,
        sample_every: 2,
        sweep_order: SweepOrder::Checkerboard,
        ..DenoiseConfig::default()
    };
    let driver = EmDriver::new(config).unwrap();
    let run = || {
        let mut rng = StdRng::seed_from_u64(77);
        driver.run(&noisy, &mut rng).unwrap()
    };
    let (a, b) = (run(), run());
    assert_eq!(a.estimates, b.estimates);
    assert_eq!(a.j, b.j);
    assert_eq!(a.mu, b.mu);
    assert_eq!(a.j.k(), 4);
}

#[test]
fn configured_shape_mismatch_is_rejected_up_front() {
    let config = DenoiseConfig {
        n_colors: 3,
        j: Some(default_j(2).unwrap()),
        ..DenoiseConfig::default()
    };
    assert!(EmDriver::new(config).is_err());
}
