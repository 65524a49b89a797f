//! Exit codes for the mrf-denoise CLI.
//!
//! Exit code ranges:
//! - 0: success
//! - 10-19: user errors (bad arguments, config or input; fixable by the caller)
//! - 20-29: internal errors (bugs, or I/O failures outside the caller's input)

use mrf_common::ErrorCategory;

/// Exit codes for mrf-denoise operations.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Clean = 0,

    // ========================================================================
    // User Errors (10-19)
    // ========================================================================
    /// Invalid arguments
    ArgsError = 10,

    /// Configuration failed to load or validate
    ConfigError = 11,

    /// Input grid or parameter violates the model contract
    InputError = 12,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// User errors (codes 10-19) can be resolved by fixing the invocation.
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    pub fn is_internal_error(self) -> bool {
        (self as i32) >= 20
    }

    /// Get the error code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::InputError => "ERR_INPUT",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }

    /// Exit code for a library error category.
    pub fn for_category(category: ErrorCategory) -> Self {
        match category {
            ErrorCategory::Input | ErrorCategory::Parameter => ExitCode::InputError,
            ErrorCategory::Config => ExitCode::ConfigError,
            ErrorCategory::Io => ExitCode::IoError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<&mrf_common::Error> for ExitCode {
    fn from(err: &mrf_common::Error) -> Self {
        ExitCode::for_category(err.category())
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
