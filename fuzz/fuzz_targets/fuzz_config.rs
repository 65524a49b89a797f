//! Fuzz target for run configuration parsing and validation.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mrf_config::{validate_config, DenoiseConfig};

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = serde_json::from_slice::<DenoiseConfig>(data) {
        if validate_config(&config).is_ok() {
            assert!(config.burnin < config.n_gibbs_iters);
            assert!(config.retained_samples() >= 1);
        }
    }
});
