//! Dense 2D label grids.
//!
//! A [`Grid`] holds one discrete label per pixel, row-major. It is used both
//! for the fixed noisy observation and for latent labelings mutated during
//! sampling. Construction guarantees a non-empty rectangular shape; label
//! range is checked against a color count with [`Grid::validate_labels`].

use crate::error::{Error, Result};
use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Dense row-major grid of labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "GridRepr", into = "Vec<Vec<usize>>")]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<usize>,
}

/// Accepted JSON encodings: nested rows, or explicit dims plus flat cells.
#[derive(Deserialize)]
#[serde(untagged)]
enum GridRepr {
    Nested(Vec<Vec<usize>>),
    Flat {
        rows: usize,
        cols: usize,
        cells: Vec<usize>,
    },
}

impl TryFrom<GridRepr> for Grid {
    type Error = Error;

    fn try_from(repr: GridRepr) -> Result<Self> {
        match repr {
            GridRepr::Nested(rows) => Grid::from_rows(rows),
            GridRepr::Flat { rows, cols, cells } => Grid::new(rows, cols, cells),
        }
    }
}

impl From<Grid> for Vec<Vec<usize>> {
    fn from(grid: Grid) -> Self {
        grid.to_rows()
    }
}

impl JsonSchema for Grid {
    fn schema_name() -> Cow<'static, str> {
        "Grid".into()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        <Vec<Vec<usize>>>::json_schema(generator)
    }
}

impl Grid {
    /// Create a grid from dimensions and row-major cells.
    pub fn new(rows: usize, cols: usize, cells: Vec<usize>) -> Result<Self> {
        let expected = Self::cell_count(rows, cols)?;
        if cells.len() != expected {
            return Err(Error::shape_mismatch(
                "grid cells",
                format!("{expected} cells for {rows}x{cols}"),
                format!("{} cells", cells.len()),
            ));
        }
        Ok(Self { rows, cols, cells })
    }

    /// Create a grid from nested rows. Rejects empty and ragged input.
    pub fn from_rows(rows: Vec<Vec<usize>>) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(Vec::len).unwrap_or(0);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
            return Err(Error::shape_mismatch(
                "grid rows",
                format!("{n_cols} columns"),
                format!("{} columns in row {i}", row.len()),
            ));
        }
        let cells = rows.into_iter().flatten().collect();
        Self::new(n_rows, n_cols, cells)
    }

    /// Create a grid with every cell set to `value`.
    pub fn filled(rows: usize, cols: usize, value: usize) -> Result<Self> {
        let n = Self::cell_count(rows, cols)?;
        Self::new(rows, cols, vec![value; n])
    }

    /// Non-zero `rows * cols`, or `DegenerateInput`.
    fn cell_count(rows: usize, cols: usize) -> Result<usize> {
        if rows == 0 || cols == 0 {
            return Err(Error::DegenerateInput(format!(
                "grid must have at least one row and column, got {rows}x{cols}"
            )));
        }
        rows.checked_mul(cols)
            .ok_or_else(|| Error::DegenerateInput(format!("grid {rows}x{cols} is too large")))
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false for a constructed grid; kept for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> usize {
        self.cells[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: usize) {
        self.cells[row * self.cols + col] = value;
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[usize] {
        let start = row * self.cols;
        &self.cells[start..start + self.cols]
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.cells
    }

    /// Row-major cells, for callers that split the grid into row chunks.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [usize] {
        &mut self.cells
    }

    /// Copy out as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<usize>> {
        self.cells.chunks(self.cols).map(<[usize]>::to_vec).collect()
    }

    /// Coordinates of the existing 4-connected neighbors of `(row, col)`.
    ///
    /// Order is up, left, down, right. Border pixels get 2 or 3 neighbors;
    /// the lattice is never padded.
    pub fn neighbor_coords(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> {
        let (rows, cols) = (self.rows, self.cols);
        let up = (row > 0).then(|| (row - 1, col));
        let left = (col > 0).then(|| (row, col - 1));
        let down = (row + 1 < rows).then(|| (row + 1, col));
        let right = (col + 1 < cols).then(|| (row, col + 1));
        [up, left, down, right].into_iter().flatten()
    }

    /// Labels of the existing 4-connected neighbors of `(row, col)`.
    pub fn neighbors(&self, row: usize, col: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbor_coords(row, col).map(|(r, c)| self.get(r, c))
    }

    /// Check that every label lies in `[0, k)`.
    pub fn validate_labels(&self, k: usize) -> Result<()> {
        match self.cells.iter().position(|&v| v >= k) {
            None => Ok(()),
            Some(idx) => Err(Error::OutOfRangeValue {
                row: idx / self.cols,
                col: idx % self.cols,
                value: self.cells[idx],
                k,
            }),
        }
    }

    /// Check that `other` has the same shape as `self`.
    pub fn ensure_same_shape(&self, other: &Grid, context: &'static str) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::shape_mismatch(
                context,
                format!("{}x{}", self.rows, self.cols),
                format!("{}x{}", other.rows, other.cols),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin_grid() -> Grid {
        Grid::from_rows(vec![vec![1, 0, 1], vec![0, 0, 1], vec![1, 1, 1]]).unwrap()
    }

    #[test]
    fn new_rejects_zero_size() {
        assert!(matches!(
            Grid::new(0, 3, vec![]),
            Err(Error::DegenerateInput(_))
        ));
        assert!(matches!(
            Grid::from_rows(vec![]),
            Err(Error::DegenerateInput(_))
        ));
    }

    #[test]
    fn new_rejects_wrong_cell_count() {
        assert!(matches!(
            Grid::new(2, 2, vec![0, 1, 0]),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn from_rows_rejects_ragged() {
        let err = Grid::from_rows(vec![vec![0, 1], vec![0]]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn neighbor_counts_depend_on_position() {
        let g = bin_grid();
        assert_eq!(g.neighbors(1, 1).count(), 4);
        assert_eq!(g.neighbors(0, 0).count(), 2);
        assert_eq!(g.neighbors(1, 0).count(), 3);
        assert_eq!(g.neighbors(2, 2).count(), 2);
    }

    #[test]
    fn neighbor_labels_follow_up_left_down_right() {
        let g = bin_grid();
        assert_eq!(g.neighbors(1, 1).collect::<Vec<_>>(), vec![0, 0, 1, 1]);
        assert_eq!(g.neighbors(0, 0).collect::<Vec<_>>(), vec![0, 0]);
        assert_eq!(g.neighbors(1, 0).collect::<Vec<_>>(), vec![1, 1, 0]);
    }

    #[test]
    fn neighbors_respect_column_bound_on_wide_grids() {
        let g = Grid::from_rows(vec![vec![0, 1, 2, 3, 4]]).unwrap();
        assert_eq!(g.neighbors(0, 2).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(g.neighbors(0, 4).collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn validate_labels_reports_first_offender() {
        let g = Grid::from_rows(vec![vec![0, 1], vec![3, 2]]).unwrap();
        assert!(g.validate_labels(4).is_ok());
        match g.validate_labels(3) {
            Err(Error::OutOfRangeValue { row, col, value, k }) => {
                assert_eq!((row, col, value, k), (1, 0, 3, 3));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn ensure_same_shape_detects_transpose() {
        let a = Grid::filled(2, 3, 0).unwrap();
        let b = Grid::filled(3, 2, 0).unwrap();
        assert!(a.ensure_same_shape(&a.clone(), "test").is_ok());
        assert!(a.ensure_same_shape(&b, "test").is_err());
    }

    #[test]
    fn serde_accepts_nested_and_flat() {
        let nested: Grid = serde_json::from_str("[[0,1],[1,0]]").unwrap();
        let flat: Grid = serde_json::from_str(r#"{"rows":2,"cols":2,"cells":[0,1,1,0]}"#).unwrap();
        assert_eq!(nested, flat);
        assert_eq!(serde_json::to_string(&nested).unwrap(), "[[0,1],[1,0]]");
    }

    #[test]
    fn serde_rejects_ragged() {
        assert!(serde_json::from_str::<Grid>("[[0,1],[1]]").is_err());
    }

    #[test]
    fn filled_rejects_overflowing_dimensions() {
        assert!(matches!(
            Grid::filled(usize::MAX, 2, 0),
            Err(Error::DegenerateInput(_))
        ));
        assert!(matches!(
            Grid::filled(0, 3, 1),
            Err(Error::DegenerateInput(_))
        ));
    }

    #[test]
    fn clone_does_not_alias() {
        let mut a = Grid::filled(2, 2, 0).unwrap();
        let b = a.clone();
        a.set(0, 0, 1);
        assert_eq!(b.get(0, 0), 0);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn adjacency_is_symmetric(rows in 1usize..8, cols in 1usize..8) {
                let g = Grid::filled(rows, cols, 0).unwrap();
                for r in 0..rows {
                    for c in 0..cols {
                        for (nr, nc) in g.neighbor_coords(r, c) {
                            prop_assert!(g.neighbor_coords(nr, nc).any(|p| p == (r, c)));
                        }
                    }
                }
            }

            #[test]
            fn first_out_of_range_cell_is_reported(
                cells in proptest::collection::vec(0usize..5, 12),
            ) {
                let g = Grid::new(3, 4, cells.clone()).unwrap();
                match cells.iter().position(|&v| v >= 3) {
                    None => prop_assert!(g.validate_labels(3).is_ok()),
                    Some(idx) => {
                        let is_first_bad = matches!(
                            g.validate_labels(3),
                            Err(Error::OutOfRangeValue { row, col, .. }) if row == idx / 4 && col == idx % 4
                        );
                        prop_assert!(is_first_bad);
                    }
                }
            }
        }
    }
}
