//! MRF Denoising Core Library
//!
//! Recovers a quantized image from a noisy observation by Gibbs sampling a
//! pairwise Markov random field and re-estimating its parameters with EM:
//! - Potential evaluation and Gibbs sweeps (`inference`)
//! - Per-cycle diagnostics (`diagnostics`)
//! - Run reports (`report`)
//! - Structured logging and CLI exit codes
//!
//! The binary entry point is in `main.rs`.

pub mod diagnostics;
pub mod exit_codes;
pub mod inference;
pub mod logging;
pub mod report;

pub use diagnostics::{disagreement_rate, mean_squared_error};
pub use inference::{EmDriver, EmOutcome, PotentialParams};
pub use report::EmReport;
