//! Configuration resolution and loading.
//!
//! Resolution order: CLI argument → environment variables → XDG paths →
//! system config → defaults. Directory overrides given on the command line
//! are applied on top of whatever file was found.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the config file directly.
pub const ENV_CONFIG_PATH: &str = "DECONFIG_CONFIG";

/// Environment variable naming a directory holding [`CONFIG_FILENAME`].
pub const ENV_CONFIG_DIR: &str = "DECONFIG_CONFIG_DIR";

/// Standard config file name.
pub const CONFIG_FILENAME: &str = "deconfig.json";

/// Application name for XDG and system directories.
const APP_NAME: &str = "deconfig";

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    Missing { path: PathBuf },

    #[error("Invalid JSON in config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Contents of `deconfig.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeconfigConfig {
    /// Directory of the export (sync) store.
    pub export_dir: PathBuf,
    /// Directory of the live (active) store.
    pub live_dir: PathBuf,
    /// Wrap the export store with redaction. When off, commands see the
    /// export store as-is.
    pub redaction: bool,
}

impl Default for DeconfigConfig {
    fn default() -> Self {
        DeconfigConfig {
            export_dir: PathBuf::from("config/sync"),
            live_dir: PathBuf::from("config/active"),
            redaction: true,
        }
    }
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/deconfig/.
    SystemConfig,

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
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Options for loading configuration, usually straight from the CLI.
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    /// Explicit config file; must exist when given.
    pub config_path: Option<PathBuf>,
    /// Overrides `export_dir` from the file.
    pub export_dir: Option<PathBuf>,
    /// Overrides `live_dir` from the file.
    pub live_dir: Option<PathBuf>,
}

/// Resolved configuration with provenance information.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: DeconfigConfig,
    /// File the values came from, if any.
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

/// Find the config file using the standard resolution order.
///
/// 1. Explicit CLI path (an error if it does not exist)
/// 2. `DECONFIG_CONFIG` environment variable
/// 3. `DECONFIG_CONFIG_DIR` environment variable + filename
/// 4. XDG config directory (~/.config/deconfig/)
/// 5. System config (/etc/deconfig/)
/// 6. Built-in defaults (None)
pub fn resolve_config_path(
    cli_path: Option<&Path>,
) -> Result<(Option<PathBuf>, ConfigSource), ConfigError> {
    if let Some(path) = cli_path {
        if !path.exists() {
            return Err(ConfigError::Missing {
                path: path.to_path_buf(),
            });
        }
        return Ok((Some(path.to_path_buf()), ConfigSource::CliArgument));
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok((Some(path), ConfigSource::Environment));
        }
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(CONFIG_FILENAME);
        if path.exists() {
            return Ok((Some(path), ConfigSource::Environment));
        }
    }

    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(CONFIG_FILENAME);
        if path.exists() {
            return Ok((Some(path), ConfigSource::XdgConfig));
        }
    }

    let system_path = system_config_dir().join(CONFIG_FILENAME);
    if system_path.exists() {
        return Ok((Some(system_path), ConfigSource::SystemConfig));
    }

    Ok((None, ConfigSource::BuiltinDefault))
}

/// Read and parse a config file.
pub fn load_config_file(path: &Path) -> Result<DeconfigConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve, load and apply CLI overrides.
pub fn load_config(options: &ConfigOptions) -> Result<ResolvedConfig, ConfigError> {
    let (path, source) = resolve_config_path(options.config_path.as_deref())?;

    let mut config = match &path {
        Some(path) => load_config_file(path)?,
        None => DeconfigConfig::default(),
    };
    if let Some(dir) = &options.export_dir {
        config.export_dir = dir.clone();
    }
    if let Some(dir) = &options.live_dir {
        config.live_dir = dir.clone();
    }

    Ok(ResolvedConfig {
        config,
        path,
        source,
    })
}

/// Get the XDG config directory for deconfig.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}
