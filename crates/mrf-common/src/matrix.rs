//! Square K×K potential matrices.
//!
//! Both the pairwise matrix J and the emission matrix mu are stored as a
//! [`Matrix`]: `values[a * k + b]` is the affinity between label `a` and
//! label `b`. Matrices are replaced wholesale between EM cycles, never
//! patched in place.

use crate::error::{Error, Result};
use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Dense square matrix of `f64` affinities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Matrix {
    k: usize,
    values: Vec<f64>,
}

impl TryFrom<Vec<Vec<f64>>> for Matrix {
    type Error = Error;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        Matrix::from_rows(rows)
    }
}

impl From<Matrix> for Vec<Vec<f64>> {
    fn from(m: Matrix) -> Self {
        m.to_rows()
    }
}

impl JsonSchema for Matrix {
    fn schema_name() -> Cow<'static, str> {
        "Matrix".into()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        <Vec<Vec<f64>>>::json_schema(generator)
    }
}

impl Matrix {
    /// All-zero K×K matrix.
    pub fn zeros(k: usize) -> Self {
        Self {
            k,
            values: vec![0.0; k * k],
        }
    }

    /// Build a matrix cell by cell.
    pub fn from_fn(k: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut values = Vec::with_capacity(k * k);
        for a in 0..k {
            for b in 0..k {
                values.push(f(a, b));
            }
        }
        Self { k, values }
    }

    /// Build from nested rows. Rejects empty, ragged and non-square input.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let k = rows.len();
        if k == 0 {
            return Err(Error::DegenerateInput("matrix has no rows".to_string()));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != k) {
            return Err(Error::shape_mismatch(
                "matrix rows",
                format!("{k} columns"),
                format!("{} columns in row {i}", row.len()),
            ));
        }
        Ok(Self {
            k,
            values: rows.into_iter().flatten().collect(),
        })
    }

    /// Number of labels on each axis.
    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    #[inline]
    pub fn get(&self, a: usize, b: usize) -> f64 {
        self.values[a * self.k + b]
    }

    #[inline]
    pub fn set(&mut self, a: usize, b: usize, value: f64) {
        self.values[a * self.k + b] = value;
    }

    #[inline]
    pub fn add(&mut self, a: usize, b: usize, delta: f64) {
        self.values[a * self.k + b] += delta;
    }

    #[inline]
    pub fn row(&self, a: usize) -> &[f64] {
        let start = a * self.k;
        &self.values[start..start + self.k]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.values.chunks(self.k).map(<[f64]>::to_vec).collect()
    }

    /// Fail with `ShapeMismatch` unless this matrix is `k`×`k`.
    pub fn ensure_k(&self, k: usize, name: &'static str) -> Result<()> {
        if self.k != k {
            return Err(Error::shape_mismatch(
                name,
                format!("{k}x{k}"),
                format!("{}x{}", self.k, self.k),
            ));
        }
        Ok(())
    }

    /// Fail with `InvalidParameter` if any cell is NaN or +inf.
    ///
    /// `-inf` is allowed: it marks a forbidden label pair and maps to zero
    /// conditional weight.
    pub fn ensure_usable(&self, name: &'static str) -> Result<()> {
        match self
            .values
            .iter()
            .position(|v| v.is_nan() || *v == f64::INFINITY)
        {
            None => Ok(()),
            Some(idx) => Err(Error::invalid_parameter(
                name,
                format!(
                    "cell ({}, {}) is {}",
                    idx / self.k,
                    idx % self.k,
                    self.values[idx]
                ),
            )),
        }
    }

    /// Mean squared cellwise difference divided by the sum of squares of
    /// `self`.
    ///
    /// Used to check that re-estimated parameters moved away from a
    /// reference. Returns +inf when `self` is all zeros and `other` is not,
    /// and 0 when both are all zeros. Infinite cells are ignored.
    pub fn normalized_squared_deviation(&self, other: &Matrix) -> Result<f64> {
        other.ensure_k(self.k, "normalized_squared_deviation")?;
        let mut diff_sq = 0.0;
        let mut norm_sq = 0.0;
        let mut n = 0usize;
        for (&a, &b) in self.values.iter().zip(other.values.iter()) {
            if !a.is_finite() || !b.is_finite() {
                continue;
            }
            diff_sq += (a - b) * (a - b);
            norm_sq += a * a;
            n += 1;
        }
        if n == 0 {
            return Ok(0.0);
        }
        let mse = diff_sq / n as f64;
        if norm_sq == 0.0 {
            return Ok(if mse == 0.0 { 0.0 } else { f64::INFINITY });
        }
        Ok(mse / norm_sq)
    }
}
