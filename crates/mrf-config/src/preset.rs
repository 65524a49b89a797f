//! Named iteration budgets.
//!
//! Presets only touch iteration counts (EM cycles, Gibbs sweeps, burn-in,
//! thinning). Model parameters such as `beta` or the matrices are left as
//! the base config has them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::settings::DenoiseConfig;

/// Available configuration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    /// Smoke-test budget for small grids
    Quick,
    /// The default budget
    Standard,
    /// Longer chains with thinning, for final results
    Thorough,
}

impl PresetName {
    /// All available preset names.
    pub const ALL: &'static [PresetName] =
        &[PresetName::Quick, PresetName::Standard, PresetName::Thorough];

    /// Get preset name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Quick => "quick",
            PresetName::Standard => "standard",
            PresetName::Thorough => "thorough",
        }
    }

    /// Parse preset name from string.
    pub fn parse(s: &str) -> Option<PresetName> {
        match s.to_lowercase().as_str() {
            "quick" | "fast" | "smoke" => Some(PresetName::Quick),
            "standard" | "default" => Some(PresetName::Standard),
            "thorough" | "slow" | "final" => Some(PresetName::Thorough),
            _ => None,
        }
    }

    /// Get a description of the preset.
    pub fn description(&self) -> &'static str {
        match self {
            PresetName::Quick => "2 EM cycles of 4 sweeps, burn-in 1",
            PresetName::Standard => "5 EM cycles of 5 sweeps, burn-in 2",
            PresetName::Thorough => "10 EM cycles of 30 sweeps, burn-in 10, every 2nd sample",
        }
    }

    /// `(n_em_iters, n_gibbs_iters, burnin, sample_every)`.
    fn budget(&self) -> (usize, usize, usize, usize) {
        match self {
            PresetName::Quick => (2, 4, 1, 1),
            PresetName::Standard => (5, 5, 2, 1),
            PresetName::Thorough => (10, 30, 10, 2),
        }
    }

    /// Overwrite the iteration budget of `config` with this preset's.
    pub fn apply(&self, config: &mut DenoiseConfig) {
        let (em, gibbs, burnin, every) = self.budget();
        config.n_em_iters = em;
        config.n_gibbs_iters = gibbs;
        config.burnin = burnin;
        config.sample_every = every;
    }

    /// Default config with this preset applied.
    pub fn config(&self) -> DenoiseConfig {
        let mut config = DenoiseConfig::default();
        self.apply(&mut config);
        config
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresetName {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s).ok_or_else(|| PresetError::UnknownPreset(s.to_string()))
    }
}

/// Errors related to preset operations.
#[derive(Debug, Clone)]
pub enum PresetError {
    /// Unknown preset name.
    UnknownPreset(String),
}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetError::UnknownPreset(name) => {
                write!(
                    f,
                    "Unknown preset '{}'. Available: {}",
                    name,
                    PresetName::ALL
                        .iter()
                        .map(|p| p.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
        }
    }
}

impl std::error::Error for PresetError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_config;

    #[test]
    fn every_preset_validates() {
        for preset in PresetName::ALL {
            assert!(validate_config(&preset.config()).is_ok(), "{preset}");
        }
    }

    #[test]
    fn standard_matches_defaults() {
        assert_eq!(PresetName::Standard.config(), DenoiseConfig::default());
    }

    #[test]
    fn apply_keeps_model_parameters() {
        let mut cfg = DenoiseConfig {
            beta: 2.5,
            n_colors: 4,
            ..Default::default()
        };
        PresetName::Thorough.apply(&mut cfg);
        assert_eq!(cfg.beta, 2.5);
        assert_eq!(cfg.n_colors, 4);
        assert_eq!(cfg.n_gibbs_iters, 30);
        assert_eq!(cfg.sample_every, 2);
    }

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!(PresetName::parse("FAST"), Some(PresetName::Quick));
        assert_eq!("default".parse::<PresetName>().unwrap(), PresetName::Standard);
        let err = "bogus".parse::<PresetName>().unwrap_err();
        assert!(err.to_string().contains("quick, standard, thorough"));
    }
}
