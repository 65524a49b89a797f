//! Fuzz target for label grid JSON parsing.
//!
//! Grids arrive from files written by other tools, so parsing and label
//! validation must return errors rather than panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mrf_common::Grid;

fuzz_target!(|data: &[u8]| {
    if let Ok(grid) = serde_json::from_slice::<Grid>(data) {
        assert_eq!(grid.len(), grid.rows() * grid.cols());
        let _ = grid.validate_labels(4);
        for (row, col) in [(0, 0), (grid.rows() - 1, grid.cols() - 1)] {
            assert!(grid.neighbors(row, col).count() <= 4);
        }
    }
});
