//! MRF inference: conditionals, Gibbs sampling, aggregation, re-estimation
//! and the EM loop that ties them together.

pub mod aggregate;
pub mod defaults;
pub mod em;
pub mod estimate;
pub mod gibbs;
pub mod potential;

pub use aggregate::expected_image;
pub use defaults::{default_j, default_mu};
pub use em::{CycleDiagnostics, EmDriver, EmOutcome};
pub use estimate::{emission_counts, estimate_emission, estimate_pairwise, pairwise_counts};
pub use gibbs::run_gibbs;
pub use potential::{conditional_distribution, neighbors, PotentialParams};
