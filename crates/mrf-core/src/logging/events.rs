//! Structured event definitions for logging.
//!
//! Events follow a consistent schema for machine-parseable JSONL output.
//! All events carry the run_id and the pipeline stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Log levels for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Stages of an EM denoising run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Config resolution, input loading, parameter setup.
    Init,
    /// Gibbs sweeps under the current parameters.
    Sample,
    /// Posterior-mode aggregation of the thinned window.
    Aggregate,
    /// Re-estimation of J and mu.
    Estimate,
    /// Report assembly and output.
    Report,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Sample => "sample",
            Stage::Aggregate => "aggregate",
            Stage::Estimate => "estimate",
            Stage::Report => "report",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // EM lifecycle
    pub const EM_STARTED: &str = "em.started";
    pub const EM_CYCLE_DONE: &str = "em.cycle_done";
    pub const EM_FINISHED: &str = "em.finished";

    // Sampling
    pub const GIBBS_SWEEP_DONE: &str = "gibbs.sweep_done";

    // Estimation
    pub const ESTIMATE_UPDATED: &str = "estimate.updated";

    // Config/init events
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
    pub const CONFIG_ERROR: &str = "config.error";

    // Output
    pub const REPORT_WRITTEN: &str = "report.written";

    // Error events
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// A structured log event for JSONL output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    /// Timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    /// Log level.
    pub level: Level,

    /// Event name (e.g., "em.started", "em.cycle_done").
    pub event: String,

    /// Unique ID for this run.
    pub run_id: String,

    /// Current stage.
    pub stage: Stage,

    /// Human-readable message.
    pub message: String,

    /// EM cycle the event belongs to, when inside the loop.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<usize>,

    /// Additional structured fields (stable keys).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub fields: HashMap<String, serde_json::Value>,
}

impl LogEvent {
    /// Create a new log event with required fields.
    pub fn new(
        level: Level,
        event: impl Into<String>,
        run_id: impl Into<String>,
        stage: Stage,
        message: impl Into<String>,
    ) -> Self {
        LogEvent {
            ts: Utc::now(),
            level,
            event: event.into(),
            run_id: run_id.into(),
            stage,
            message: message.into(),
            cycle: None,
            fields: HashMap::new(),
        }
    }

    /// Tag the event with an EM cycle index.
    pub fn with_cycle(mut self, cycle: usize) -> Self {
        self.cycle = Some(cycle);
        self
    }

    /// Add a field to the event.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.fields.insert(key.into(), v);
        }
        self
    }

    /// Serialize to a single JSON line.
    pub fn to_jsonl(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"error":"serialization_failed","event":"{}"}}"#,
                self.event
            )
        })
    }
}

/// Context for generating log events with a consistent run ID.
#[derive(Debug, Clone)]
pub struct LogContext {
    /// Unique ID for this run.
    pub run_id: String,
}

impl LogContext {
    /// Create a new log context.
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
        }
    }

    /// Create a context with a freshly generated run ID.
    pub fn generate() -> Self {
        Self::new(super::generate_run_id())
    }

    /// Create an event with this context.
    pub fn event(
        &self,
        level: Level,
        event: impl Into<String>,
        stage: Stage,
        message: impl Into<String>,
    ) -> LogEvent {
        LogEvent::new(level, event, &self.run_id, stage, message)
    }

    /// Shortcut for info-level event.
    pub fn info(
        &self,
        event: impl Into<String>,
        stage: Stage,
        message: impl Into<String>,
    ) -> LogEvent {
        self.event(Level::Info, event, stage, message)
    }

    /// Shortcut for debug-level event.
    pub fn debug(
        &self,
        event: impl Into<String>,
        stage: Stage,
        message: impl Into<String>,
    ) -> LogEvent {
        self.event(Level::Debug, event, stage, message)
    }
}

impl Default for LogContext {
    fn default() -> Self {
        Self::generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_serialization() {
        let event = LogEvent::new(
            Level::Info,
            "em.started",
            "run-12345",
            Stage::Init,
            "Starting EM run",
        )
        .with_field("n_colors", 4);

        let json = event.to_jsonl();
        assert!(json.contains(r#""event":"em.started""#));
        assert!(json.contains(r#""level":"info""#));
        assert!(json.contains(r#""stage":"init""#));
        assert!(json.contains(r#""run_id":"run-12345""#));
        assert!(!json.contains("cycle"));
    }

    #[test]
    fn test_log_event_with_cycle() {
        let event = LogEvent::new(
            Level::Debug,
            "em.cycle_done",
            "run-12345",
            Stage::Estimate,
            "Cycle complete",
        )
        .with_cycle(3);

        let json = event.to_jsonl();
        assert!(json.contains(r#""cycle":3"#));
        assert!(json.contains(r#""stage":"estimate""#));
    }

    #[test]
    fn test_log_context() {
        let ctx = LogContext::new("run-abc");
        let event = ctx.info("em.cycle_done", Stage::Sample, "Sampled");
        assert_eq!(event.run_id, "run-abc");
        assert_eq!(event.stage, Stage::Sample);
        assert_eq!(event.level, Level::Info);
    }

    #[test]
    fn test_generated_contexts_differ() {
        assert_ne!(LogContext::generate().run_id, LogContext::generate().run_id);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Sample.to_string(), "sample");
        assert_eq!(Stage::Aggregate.to_string(), "aggregate");
        assert_eq!(Stage::Estimate.to_string(), "estimate");
    }

    #[test]
    fn test_event_names() {
        assert_eq!(event_names::EM_STARTED, "em.started");
        assert_eq!(event_names::GIBBS_SWEEP_DONE, "gibbs.sweep_done");
        assert_eq!(event_names::ESTIMATE_UPDATED, "estimate.updated");
    }
}
