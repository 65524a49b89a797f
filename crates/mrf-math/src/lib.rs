//! MRF denoising math utilities.

pub mod math;

pub use math::categorical::{draw_categorical, sample_index};
pub use math::dirichlet::{log_predictive_probs, SymmetricDirichlet};
pub use math::stable::*;
