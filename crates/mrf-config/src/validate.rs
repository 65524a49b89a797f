//! Configuration validation errors and semantic validation.

use mrf_common::{Error, Matrix};
use thiserror::Error;

use crate::settings::DenoiseConfig;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },

    #[error("Shape mismatch for {field}: expected {expected}, got {actual}")]
    ShapeMismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
            ValidationError::ShapeMismatch { .. } => 67,
        }
    }

    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field,
            message: message.into(),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidValue { field, message } => Error::InvalidParameter {
                name: field,
                message,
            },
            ValidationError::ShapeMismatch {
                field,
                expected,
                actual,
            } => Error::ShapeMismatch {
                context: field,
                expected,
                actual,
            },
            other => Error::Config(other.to_string()),
        }
    }
}

/// Validate a run configuration semantically.
///
/// Checks, in order: schema version, color count, iteration budget
/// (`burnin < n_gibbs_iters`, `sample_every >= 1`), `beta` and `smoothing`
/// domains, then the shape and finiteness of any supplied matrices.
pub fn validate_config(config: &DenoiseConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    if config.n_colors < 2 {
        return Err(ValidationError::invalid(
            "n_colors",
            format!("must be at least 2, got {}", config.n_colors),
        ));
    }

    if config.n_em_iters == 0 {
        return Err(ValidationError::invalid("n_em_iters", "must be at least 1"));
    }

    if config.n_gibbs_iters == 0 {
        return Err(ValidationError::invalid(
            "n_gibbs_iters",
            "must be at least 1",
        ));
    }

    if config.burnin >= config.n_gibbs_iters {
        return Err(ValidationError::invalid(
            "burnin",
            format!(
                "must be less than n_gibbs_iters ({}), got {}",
                config.n_gibbs_iters, config.burnin
            ),
        ));
    }

    if config.sample_every == 0 {
        return Err(ValidationError::invalid("sample_every", "must be at least 1"));
    }

    if !config.beta.is_finite() || config.beta <= 0.0 {
        return Err(ValidationError::invalid(
            "beta",
            format!("must be positive and finite, got {}", config.beta),
        ));
    }

    if !config.smoothing.is_finite() || config.smoothing < 0.0 {
        return Err(ValidationError::invalid(
            "smoothing",
            format!("must be non-negative and finite, got {}", config.smoothing),
        ));
    }

    if let Some(j) = &config.j {
        validate_matrix("j", j, config.n_colors)?;
    }
    if let Some(mu) = &config.mu {
        validate_matrix("mu", mu, config.n_colors)?;
    }

    Ok(())
}

fn validate_matrix(field: &'static str, m: &Matrix, k: usize) -> ValidationResult<()> {
    if m.k() != k {
        return Err(ValidationError::ShapeMismatch {
            field,
            expected: format!("{k}x{k}"),
            actual: format!("{}x{}", m.k(), m.k()),
        });
    }
    if let Some(idx) = m
        .as_slice()
        .iter()
        .position(|v| v.is_nan() || *v == f64::INFINITY)
    {
        return Err(ValidationError::invalid(
            field,
            format!("cell ({}, {}) is not usable as an energy", idx / k, idx % k),
        ));
    }
    Ok(())
}
