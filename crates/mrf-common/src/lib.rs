//! MRF denoising common types and errors.
//!
//! This crate provides foundational types shared across the workspace:
//! - Dense label grids and K×K potential matrices
//! - Sweep-order and affinity-scale switches
//! - Common error types with stable codes
//! - Output format specifications

pub mod error;
pub mod grid;
pub mod matrix;
pub mod modes;
pub mod output;

pub use error::{Error, ErrorCategory, Result, StructuredError};
pub use grid::Grid;
pub use matrix::Matrix;
pub use modes::{AffinityScale, SweepOrder};
pub use output::OutputFormat;

/// Schema version stamped on serialized run reports.
pub const SCHEMA_VERSION: &str = "1.0.0";
