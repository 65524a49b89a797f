//! Logging configuration.
//!
//! Resolution order, later wins:
//! 1. Built-in defaults (human format, info level, timestamps on)
//! 2. `RUST_LOG` (loudest level named in any directive), unless `MRF_LOG` is set
//! 3. `MRF_LOG`, `MRF_LOG_FORMAT`, `MRF_LOG_TIMESTAMPS`
//! 4. CLI flags (`--log-level`, `--log-format`, `-v`, `-q`)

use clap::ValueEnum;

/// Environment variable selecting the log level.
pub const ENV_LOG_LEVEL: &str = "MRF_LOG";
/// Environment variable selecting the log format.
pub const ENV_LOG_FORMAT: &str = "MRF_LOG_FORMAT";
/// Environment variable toggling timestamps in human output (`0`/`false` disables).
pub const ENV_LOG_TIMESTAMPS: &str = "MRF_LOG_TIMESTAMPS";

/// Log output format on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    #[value(alias = "console", alias = "pretty")]
    Human,
    /// One JSON object per event.
    #[value(alias = "json", alias = "structured")]
    Jsonl,
}

/// Minimum level, ordered from quietest to loudest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, ValueEnum)]
pub enum LogLevel {
    #[value(alias = "none", alias = "quiet")]
    Off,
    Error,
    #[value(alias = "warning")]
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn write_value_name<T: ValueEnum>(value: &T, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match value.to_possible_value() {
        Some(pv) => f.write_str(pv.get_name()),
        None => Ok(()),
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_value_name(self, f)
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_value_name(self, f)
    }
}

impl LogLevel {
    /// One step more verbose, saturating at trace.
    pub fn louder(self) -> Self {
        let all = Self::value_variants();
        let idx = all.iter().position(|l| *l == self).unwrap_or(0);
        all[(idx + 1).min(all.len() - 1)]
    }

    /// Loudest level named in a `RUST_LOG`-style directive list.
    ///
    /// `"mrf_core=debug,warn"` yields debug. Directives naming no level
    /// (bare targets) are skipped.
    pub fn loudest_in_directives(directives: &str) -> Option<Self> {
        directives
            .split(',')
            .filter_map(|d| {
                let level = d.rsplit('=').next().unwrap_or(d).trim();
                Self::from_str(level, true).ok()
            })
            .max()
    }
}

impl From<LogLevel> for tracing_subscriber::filter::LevelFilter {
    fn from(level: LogLevel) -> Self {
        use tracing_subscriber::filter::LevelFilter;
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Timestamps in human output; JSON output always carries them.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::default(),
            level: LogLevel::default(),
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Resolve from the process environment and CLI overrides.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), cli_level, cli_format)
    }

    /// Same as [`LogConfig::from_env`] with an injectable variable lookup.
    ///
    /// Unparseable values are ignored.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        cli_level: Option<LogLevel>,
        cli_format: Option<LogFormat>,
    ) -> Self {
        let env_level = match lookup(ENV_LOG_LEVEL) {
            Some(val) => LogLevel::from_str(val.trim(), true).ok(),
            None => lookup("RUST_LOG").and_then(|val| LogLevel::loudest_in_directives(&val)),
        };
        let env_format =
            lookup(ENV_LOG_FORMAT).and_then(|val| LogFormat::from_str(val.trim(), true).ok());
        let timestamps = lookup(ENV_LOG_TIMESTAMPS)
            .map(|val| !matches!(val.trim().to_ascii_lowercase().as_str(), "0" | "false" | "off"))
            .unwrap_or(true);

        LogConfig {
            format: cli_format.or(env_format).unwrap_or_default(),
            level: cli_level.or(env_level).unwrap_or_default(),
            timestamps,
        }
    }
}
