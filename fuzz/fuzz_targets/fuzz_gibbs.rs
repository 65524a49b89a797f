//! Fuzz target for Gibbs sweeps on arbitrary small models.
//!
//! Any finite matrices and positive beta must yield in-range samples.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mrf_common::{Grid, Matrix, SweepOrder};
use mrf_core::inference::run_gibbs;
use mrf_core::PotentialParams;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Arbitrary)]
struct Input {
    k: u8,
    rows: u8,
    cols: u8,
    cells: Vec<u8>,
    weights: Vec<i16>,
    beta: u8,
    seed: u64,
    checkerboard: bool,
}

fuzz_target!(|input: Input| {
    let k = (input.k % 5) as usize + 2;
    let rows = (input.rows % 8) as usize + 1;
    let cols = (input.cols % 8) as usize + 1;
    if input.cells.len() < rows * cols || input.weights.len() < 2 * k * k {
        return;
    }
    let cells: Vec<usize> = input.cells[..rows * cols]
        .iter()
        .map(|&v| v as usize % k)
        .collect();
    let Ok(grid) = Grid::new(rows, cols, cells) else {
        return;
    };
    let scaled: Vec<f64> = input.weights.iter().map(|&w| w as f64 / 100.0).collect();
    let j = Matrix::from_fn(k, |a, b| scaled[a * k + b]);
    let mu = Matrix::from_fn(k, |a, b| scaled[k * k + a * k + b]);
    let beta = (input.beta as f64 + 1.0) / 16.0;
    let Ok(params) = PotentialParams::new(j, mu, beta) else {
        return;
    };
    let order = if input.checkerboard {
        SweepOrder::Checkerboard
    } else {
        SweepOrder::Raster
    };

    let mut rng = StdRng::seed_from_u64(input.seed);
    let samples = run_gibbs(&grid, &grid, &params, 2, order, &mut rng)
        .expect("valid model must sample");
    assert_eq!(samples.len(), 2);
    for sample in &samples {
        assert!(sample.validate_labels(k).is_ok());
    }
});
