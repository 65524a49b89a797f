//! Error types for MRF denoising.
//!
//! Every error here is a caller contract violation or an outer-surface
//! failure (config, I/O). None of them are transient, so nothing in the
//! workspace retries on error: a failing run aborts without partial output.
//!
//! Errors serialize to structured JSON for machine consumers:
//! ```json
//! {
//!   "code": 12,
//!   "category": "input",
//!   "message": "label 7 at (3, 4) is outside [0, 4)",
//!   "recoverable": false,
//!   "context": { "row": 3, "col": 4 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for MRF denoising operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed grids: wrong shape, empty, labels out of range.
    Input,
    /// Numeric parameters outside their valid domain.
    Parameter,
    /// Configuration file errors.
    Config,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Parameter => write!(f, "parameter"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for MRF denoising.
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (10-19)
    #[error("shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: &'static str,
        expected: String,
        actual: String,
    },

    #[error("label {value} at ({row}, {col}) is outside [0, {k})")]
    OutOfRangeValue {
        row: usize,
        col: usize,
        value: usize,
        k: usize,
    },

    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    // Parameter errors (20-29)
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter { name: &'static str, message: String },

    // Configuration errors (30-39)
    #[error("configuration error: {0}")]
    Config(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Convenience constructor for parameter violations.
    pub fn invalid_parameter(name: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            message: message.into(),
        }
    }

    /// Convenience constructor for shape violations.
    pub fn shape_mismatch(
        context: &'static str,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        Error::ShapeMismatch {
            context,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Input errors
    /// - 20-29: Parameter errors
    /// - 30-39: Configuration errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::ShapeMismatch { .. } => 10,
            Error::OutOfRangeValue { .. } => 11,
            Error::DegenerateInput(_) => 12,
            Error::InvalidParameter { .. } => 20,
            Error::Config(_) => 30,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::ShapeMismatch { .. }
            | Error::OutOfRangeValue { .. }
            | Error::DegenerateInput(_) => ErrorCategory::Input,
            Error::InvalidParameter { .. } => ErrorCategory::Parameter,
            Error::Config(_) => ErrorCategory::Config,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether retrying the same call could succeed.
    ///
    /// Contract violations never resolve on retry; only I/O can.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Io(_))
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::ShapeMismatch { .. } => "Shape Mismatch",
            Error::OutOfRangeValue { .. } => "Label Out of Range",
            Error::DegenerateInput(_) => "Degenerate Input",
            Error::InvalidParameter { .. } => "Invalid Parameter",
            Error::Config(_) => "Configuration Error",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::ShapeMismatch { .. } => {
                "All grids in a run must share one shape and matrices must be K×K for the configured color count."
            }
            Error::OutOfRangeValue { .. } => {
                "Quantize the image to the configured number of colors before denoising, or raise n_colors."
            }
            Error::DegenerateInput(_) => "Provide a non-empty, rectangular grid.",
            Error::InvalidParameter { .. } => {
                "Run 'mrf-denoise check' to validate the configuration."
            }
            Error::Config(_) => "Run 'mrf-denoise check --config <file>' to see the failing field.",
            Error::Io(_) => "Check that the path exists and is readable/writable.",
            Error::Json(_) => "Invalid JSON. Check syntax with 'jq . <file>'.",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Additional structured context (e.g., offending cell).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::OutOfRangeValue { row, col, value, k } => {
                context.insert("row".to_string(), serde_json::json!(row));
                context.insert("col".to_string(), serde_json::json!(col));
                context.insert("value".to_string(), serde_json::json!(value));
                context.insert("k".to_string(), serde_json::json!(k));
            }
            Error::InvalidParameter { name, .. } => {
                context.insert("parameter".to_string(), serde_json::json!(name));
            }
            Error::ShapeMismatch { context: what, .. } => {
                context.insert("context".to_string(), serde_json::json!(what));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_grouped_by_category() {
        let cases: Vec<(Error, ErrorCategory)> = vec![
            (
                Error::shape_mismatch("grid", "3x3", "3x4"),
                ErrorCategory::Input,
            ),
            (
                Error::OutOfRangeValue {
                    row: 0,
                    col: 1,
                    value: 5,
                    k: 2,
                },
                ErrorCategory::Input,
            ),
            (
                Error::DegenerateInput("empty".into()),
                ErrorCategory::Input,
            ),
            (
                Error::invalid_parameter("beta", "must be positive"),
                ErrorCategory::Parameter,
            ),
            (Error::Config("bad".into()), ErrorCategory::Config),
        ];
        for (err, category) in cases {
            assert_eq!(err.category(), category, "{err}");
            let code = err.code();
            let expected_range = match category {
                ErrorCategory::Input => 10..20,
                ErrorCategory::Parameter => 20..30,
                ErrorCategory::Config => 30..40,
                ErrorCategory::Io => 60..70,
            };
            assert!(expected_range.contains(&code), "{err} -> {code}");
        }
    }

    #[test]
    fn contract_violations_are_not_recoverable() {
        assert!(!Error::DegenerateInput("x".into()).is_recoverable());
        assert!(!Error::invalid_parameter("k", "too small").is_recoverable());
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(Error::Io(io).is_recoverable());
    }

    #[test]
    fn out_of_range_message_names_the_cell() {
        let err = Error::OutOfRangeValue {
            row: 3,
            col: 4,
            value: 7,
            k: 4,
        };
        assert_eq!(err.to_string(), "label 7 at (3, 4) is outside [0, 4)");
    }

    #[test]
    fn structured_error_carries_context() {
        let err = Error::OutOfRangeValue {
            row: 1,
            col: 2,
            value: 9,
            k: 3,
        };
        let structured = StructuredError::from(&err);
        assert_eq!(structured.code, 11);
        assert_eq!(structured.category, ErrorCategory::Input);
        assert!(!structured.recoverable);
        assert_eq!(structured.context["row"], serde_json::json!(1));

        let json = structured.to_json();
        assert!(json.contains("\"category\":\"input\""));
    }
}
