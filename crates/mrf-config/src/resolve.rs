//! Configuration resolution and loading.
//!
//! Resolution order: CLI argument → environment variable → XDG path → defaults.

use std::path::{Path, PathBuf};

use crate::settings::DenoiseConfig;
use crate::snapshot::ConfigSnapshot;
use crate::validate::{validate_config, ValidationError, ValidationResult};

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// A resolved configuration path (or none, for built-in defaults).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPath {
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

/// A parsed, validated configuration plus its provenance snapshot.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: DenoiseConfig,
    pub snapshot: ConfigSnapshot,
}

/// Environment variable holding a config file path.
pub const ENV_CONFIG_PATH: &str = "MRF_DENOISE_CONFIG";

/// Standard config file name.
const CONFIG_FILENAME: &str = "config.json";

/// Application name for XDG directories.
const APP_NAME: &str = "mrf-denoise";

/// Resolve the configuration path using the standard resolution order.
///
/// 1. Explicit CLI path. Returned even if missing, so loading reports it.
/// 2. `MRF_DENOISE_CONFIG`, if the file exists
/// 3. `$XDG_CONFIG_HOME/mrf-denoise/config.json`, if it exists
/// 4. Built-in defaults (no path)
pub fn resolve_config(cli_path: Option<&Path>) -> ConfigPath {
    resolve_from(
        cli_path,
        std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from),
        xdg_config_dir(),
    )
}

/// Resolution with the environment lookups supplied by the caller.
pub fn resolve_from(
    cli_path: Option<&Path>,
    env_path: Option<PathBuf>,
    xdg_dir: Option<PathBuf>,
) -> ConfigPath {
    if let Some(path) = cli_path {
        return ConfigPath {
            path: Some(path.to_path_buf()),
            source: ConfigSource::CliArgument,
        };
    }

    if let Some(path) = env_path.filter(|p| p.exists()) {
        return ConfigPath {
            path: Some(path),
            source: ConfigSource::Environment,
        };
    }

    if let Some(path) = xdg_dir
        .map(|d| d.join(CONFIG_FILENAME))
        .filter(|p| p.exists())
    {
        return ConfigPath {
            path: Some(path),
            source: ConfigSource::XdgConfig,
        };
    }

    ConfigPath::default()
}

/// Get the XDG config directory for mrf-denoise.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Read, parse and validate the config at `resolved`.
///
/// With no path, returns validated defaults and a defaults-only snapshot.
pub fn load_config(resolved: &ConfigPath) -> ValidationResult<LoadedConfig> {
    let Some(path) = &resolved.path else {
        let config = DenoiseConfig::default();
        validate_config(&config)?;
        return Ok(LoadedConfig {
            snapshot: ConfigSnapshot::defaults_only(&config),
            config,
        });
    };

    let raw = std::fs::read_to_string(path)
        .map_err(|e| ValidationError::IoError(format!("{}: {e}", path.display())))?;
    let config = DenoiseConfig::from_json_str(&raw)?;
    validate_config(&config)?;
    let snapshot = ConfigSnapshot::new(&config, resolved, Some(&raw));
    Ok(LoadedConfig { config, snapshot })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_config_source_display() {
        assert_eq!(format!("{}", ConfigSource::CliArgument), "CLI argument");
        assert_eq!(
            format!("{}", ConfigSource::Environment),
            "environment variable"
        );
        assert_eq!(format!("{}", ConfigSource::XdgConfig), "XDG config");
        assert_eq!(
            format!("{}", ConfigSource::BuiltinDefault),
            "builtin default"
        );
    }

    #[test]
    fn cli_path_wins_even_if_missing() {
        let resolved = resolve_from(
            Some(Path::new("/nonexistent/cfg.json")),
            Some(PathBuf::from("/also/missing")),
            None,
        );
        assert_eq!(resolved.source, ConfigSource::CliArgument);
    }

    #[test]
    fn env_path_used_when_present() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("env.json");
        fs::write(&file, "{}").unwrap();
        let resolved = resolve_from(None, Some(file.clone()), None);
        assert_eq!(resolved.source, ConfigSource::Environment);
        assert_eq!(resolved.path, Some(file));
    }

    #[test]
    fn missing_env_path_falls_through_to_xdg() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.json"), "{}").unwrap();
        let resolved = resolve_from(
            None,
            Some(dir.path().join("absent.json")),
            Some(dir.path().to_path_buf()),
        );
        assert_eq!(resolved.source, ConfigSource::XdgConfig);
    }

    #[test]
    fn nothing_found_means_defaults() {
        let dir = TempDir::new().unwrap();
        let resolved = resolve_from(None, None, Some(dir.path().to_path_buf()));
        assert_eq!(resolved, ConfigPath::default());
        let loaded = load_config(&resolved).unwrap();
        assert_eq!(loaded.config, DenoiseConfig::default());
        assert_eq!(loaded.snapshot.config_source, "builtin default");
    }

    #[test]
    fn load_reports_missing_file_as_io_error() {
        let resolved = resolve_from(Some(Path::new("/nonexistent/cfg.json")), None, None);
        assert!(matches!(
            load_config(&resolved),
            Err(ValidationError::IoError(_))
        ));
    }
}
