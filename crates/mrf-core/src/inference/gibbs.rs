//! Single-site Gibbs sampling over a label grid.
//!
//! A sweep resamples every pixel once from its conditional given the current
//! neighbors and the fixed observation. Two visitation orders are supported:
//!
//! - [`SweepOrder::Raster`]: row-major. Each draw sees every write made
//!   earlier in the same sweep. One uniform per pixel is taken from the run's
//!   generator, so a seed fixes the whole chain.
//! - [`SweepOrder::Checkerboard`]: all pixels with even `row + col`, then all
//!   with odd. Pixels of one parity are never adjacent, so their conditionals
//!   depend only on the other parity, which is frozen for the phase. Each
//!   phase takes one `u64` from the run's generator and derives a child
//!   generator per row, so results do not depend on how rows are scheduled.
//!   With the `parallel` feature, rows of a phase are updated by rayon.
//!
//! The caller's grid is never touched; every returned sample is an owned
//! snapshot.

use mrf_common::{Error, Grid, Result, SweepOrder};
use mrf_math::draw_categorical;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, trace};

use super::potential::{conditional_unchecked, PotentialParams};
use crate::logging::event_names;

/// Odd 64-bit constant (2^64 / φ) used to spread row indices across seeds.
const ROW_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Run `n_iter` sweeps starting from a copy of `initial`.
///
/// Returns exactly `n_iter` snapshots, one per sweep, in chain order.
/// `observed` is the fixed emission evidence. Both grids must share a shape
/// and hold labels in `[0, K)` where K comes from `params`.
pub fn run_gibbs<R: Rng + ?Sized>(
    observed: &Grid,
    initial: &Grid,
    params: &PotentialParams,
    n_iter: usize,
    order: SweepOrder,
    rng: &mut R,
) -> Result<Vec<Grid>> {
    let k = params.k();
    observed.ensure_same_shape(initial, "gibbs initial grid")?;
    observed.validate_labels(k)?;
    initial.validate_labels(k)?;

    let mut current = initial.clone();
    let mut samples = Vec::with_capacity(n_iter);
    for sweep in 0..n_iter {
        match order {
            SweepOrder::Raster => raster_sweep(&mut current, observed, params, rng)?,
            SweepOrder::Checkerboard => checkerboard_sweep(&mut current, observed, params, rng)?,
        }
        trace!(
            event = event_names::GIBBS_SWEEP_DONE,
            sweep,
            order = %order,
            "Gibbs sweep complete"
        );
        samples.push(current.clone());
    }

    debug!(
        event = event_names::GIBBS_SWEEP_DONE,
        sweeps = n_iter,
        rows = observed.rows(),
        cols = observed.cols(),
        k,
        "Gibbs chain complete"
    );
    Ok(samples)
}

fn draw_label<R: Rng + ?Sized>(
    grid: &Grid,
    row: usize,
    col: usize,
    observed: usize,
    params: &PotentialParams,
    rng: &mut R,
) -> Result<usize> {
    let probs = conditional_unchecked(grid, row, col, observed, params)?;
    let label = draw_categorical(&probs, rng).ok_or_else(|| {
        Error::DegenerateInput(format!("empty conditional at ({row}, {col})"))
    })?;
    debug_assert!(label < params.k());
    Ok(label)
}

fn raster_sweep<R: Rng + ?Sized>(
    grid: &mut Grid,
    observed: &Grid,
    params: &PotentialParams,
    rng: &mut R,
) -> Result<()> {
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let label = draw_label(grid, row, col, observed.get(row, col), params, rng)?;
            grid.set(row, col, label);
        }
    }
    Ok(())
}

fn row_seed(phase_seed: u64, row: usize) -> u64 {
    phase_seed.wrapping_add((row as u64).wrapping_add(1).wrapping_mul(ROW_SEED_STRIDE))
}

/// Resample the pixels of `row` whose `row + col` parity equals `phase`.
///
/// Neighbors are read from `frozen`, the grid as it stood when the phase
/// began; none of them belong to this phase.
fn update_row(
    cells: &mut [usize],
    row: usize,
    phase: usize,
    frozen: &Grid,
    observed: &Grid,
    params: &PotentialParams,
    seed: u64,
) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = (row + phase) % 2;
    for col in (start..cells.len()).step_by(2) {
        cells[col] = draw_label(frozen, row, col, observed.get(row, col), params, &mut rng)?;
    }
    Ok(())
}

fn checkerboard_sweep<R: Rng + ?Sized>(
    grid: &mut Grid,
    observed: &Grid,
    params: &PotentialParams,
    rng: &mut R,
) -> Result<()> {
    for phase in 0..2 {
        let phase_seed: u64 = rng.random();
        let frozen = grid.clone();
        update_phase(grid, phase, phase_seed, &frozen, observed, params)?;
    }
    Ok(())
}

#[cfg(not(feature = "parallel"))]
fn update_phase(
    grid: &mut Grid,
    phase: usize,
    phase_seed: u64,
    frozen: &Grid,
    observed: &Grid,
    params: &PotentialParams,
) -> Result<()> {
    let cols = grid.cols();
    for (row, cells) in grid.as_mut_slice().chunks_mut(cols).enumerate() {
        let seed = row_seed(phase_seed, row);
        update_row(cells, row, phase, frozen, observed, params, seed)?;
    }
    Ok(())
}

#[cfg(feature = "parallel")]
fn update_phase(
    grid: &mut Grid,
    phase: usize,
    phase_seed: u64,
    frozen: &Grid,
    observed: &Grid,
    params: &PotentialParams,
) -> Result<()> {
    let cols = grid.cols();
    grid.as_mut_slice()
        .par_chunks_mut(cols)
        .enumerate()
        .try_for_each(|(row, cells)| {
            let seed = row_seed(phase_seed, row);
            update_row(cells, row, phase, frozen, observed, params, seed)
        })
}
