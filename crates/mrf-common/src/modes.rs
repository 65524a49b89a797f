//! Algorithm switches shared by configuration and the sampler/estimator.

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Pixel visitation order within one Gibbs sweep.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SweepOrder {
    /// Row-major single-site updates; each draw sees every earlier write.
    #[default]
    Raster,
    /// Two phases over the (row + col) parity classes. Pixels in one phase
    /// are never adjacent, so a phase may be updated in parallel.
    Checkerboard,
}

impl std::fmt::Display for SweepOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SweepOrder::Raster => write!(f, "raster"),
            SweepOrder::Checkerboard => write!(f, "checkerboard"),
        }
    }
}

/// How re-estimated counts are turned into affinities.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum AffinityScale {
    /// Smoothed co-occurrence counts, used directly as energies.
    #[default]
    Counts,
    /// Log of the row-normalized smoothed frequency.
    LogConditional,
}

impl std::fmt::Display for AffinityScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AffinityScale::Counts => write!(f, "counts"),
            AffinityScale::LogConditional => write!(f, "log_conditional"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_names_match_display() {
        for order in [SweepOrder::Raster, SweepOrder::Checkerboard] {
            assert_eq!(serde_json::to_string(&order).unwrap(), format!("\"{order}\""));
        }
        for scale in [AffinityScale::Counts, AffinityScale::LogConditional] {
            assert_eq!(serde_json::to_string(&scale).unwrap(), format!("\"{scale}\""));
        }
    }

    #[test]
    fn defaults() {
        assert_eq!(SweepOrder::default(), SweepOrder::Raster);
        assert_eq!(AffinityScale::default(), AffinityScale::Counts);
    }
}
