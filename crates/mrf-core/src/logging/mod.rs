//! Structured logging for mrf-core.
//!
//! Provides dual-mode logging:
//! - Human-readable console output for interactive use
//! - Machine-parseable JSON lines for pipelines
//!
//! stdout is reserved for command payloads (reports, matrices). All log
//! output goes to stderr. Library code only emits `tracing` events; the
//! binary decides whether and how to install a subscriber.
//!
//! # Usage
//!
//! ```ignore
//! use mrf_core::logging::{init_logging, LogConfig, LogContext, Stage, event_names};
//!
//! let config = LogConfig::from_env(None, None);
//! init_logging(&config);
//!
//! let ctx = LogContext::generate();
//! mrf_core::log_event!(ctx, INFO, event_names::EM_STARTED, Stage::Init, "Starting EM run");
//! ```

pub mod config;
pub mod events;

pub use config::{LogConfig, LogFormat, LogLevel};
pub use events::{event_names, Level, LogContext, LogEvent, Stage};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the logging subsystem.
///
/// Call once at startup. A second call leaves the first subscriber in place.
/// `RUST_LOG` directives, when present, replace the level from `config`.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "mrf_core={level},mrf_config={level}",
            level = config.level
        ))
    });

    let result = match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_ansi);

            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .try_init()
            }
        }
        LogFormat::Jsonl => {
            let json_layer = fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .try_init()
        }
    };

    if result.is_err() {
        tracing::debug!("Logging already initialized; keeping existing subscriber");
    }
}

/// Generate a unique run ID for this invocation.
pub fn generate_run_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    // First 12 hex chars are enough for correlation
    format!("run-{}", &uuid.simple().to_string()[..12])
}

/// Structured event logging with a [`LogContext`].
///
/// ```ignore
/// log_event!(ctx, INFO, event_names::EM_STARTED, Stage::Init, "Starting EM run");
/// log_event!(ctx, DEBUG, event_names::EM_CYCLE_DONE, Stage::Estimate, "Cycle done",
///     cycle = 3, mse_vs_noisy = 0.12);
/// ```
#[macro_export]
macro_rules! log_event {
    ($ctx:expr, INFO, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::info!(
            event = $event,
            run_id = %$ctx.run_id,
            stage = %$stage,
            $($key = $val,)*
            message = $msg
        )
    };
    ($ctx:expr, DEBUG, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::debug!(
            event = $event,
            run_id = %$ctx.run_id,
            stage = %$stage,
            $($key = $val,)*
            message = $msg
        )
    };
    ($ctx:expr, WARN, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::warn!(
            event = $event,
            run_id = %$ctx.run_id,
            stage = %$stage,
            $($key = $val,)*
            message = $msg
        )
    };
    ($ctx:expr, ERROR, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::error!(
            event = $event,
            run_id = %$ctx.run_id,
            stage = %$stage,
            $($key = $val,)*
            message = $msg
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_run_id() {
        let id1 = generate_run_id();
        let id2 = generate_run_id();

        assert!(id1.starts_with("run-"));
        assert_ne!(id1, id2);
        // run-<12 hex chars>
        assert_eq!(id1.len(), 16);
        assert!(id1[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_log_config_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.format, LogFormat::Human);
        assert_eq!(config.level, LogLevel::Info);
    }

    #[test]
    fn test_stage_serialization() {
        assert_eq!(serde_json::to_string(&Stage::Sample).unwrap(), "\"sample\"");
        assert_eq!(serde_json::to_string(&Stage::Estimate).unwrap(), "\"estimate\"");
    }

    #[test]
    fn test_level_from_tracing() {
        assert_eq!(Level::from(tracing::Level::INFO), Level::Info);
        assert_eq!(Level::from(tracing::Level::DEBUG), Level::Debug);
        assert_eq!(Level::from(tracing::Level::ERROR), Level::Error);
    }

    #[test]
    fn test_log_event_macro_compiles_without_subscriber() {
        let ctx = LogContext::new("run-test");
        crate::log_event!(ctx, INFO, event_names::EM_STARTED, Stage::Init, "started");
        crate::log_event!(
            ctx,
            DEBUG,
            event_names::EM_CYCLE_DONE,
            Stage::Estimate,
            "cycle",
            cycle = 1usize,
            mse = 0.5f64
        );
    }
}
