//! # Configuration
//!
//! Settings for the `screenflow` binary with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.screenflow/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use simplelog::LevelFilter;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::flow::DEFAULT_WORKER_NAME;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ScreenflowConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub flow: FlowConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub start_screen: Option<String>,
    pub log_file: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FlowConfig {
    pub worker_name: Option<String>,
}

/// Values given on the command line. `None` = flag not passed.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub start_screen: Option<String>,
    pub log_file: Option<String>,
    pub log_level: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_LOG_FILE: &str = "screenflow.log";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Screen to show first instead of the home screen.
    pub start_screen: Option<String>,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
    pub worker_name: String,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.screenflow/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".screenflow").join("config.toml"))
}

/// Load config from `~/.screenflow/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `ScreenflowConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<ScreenflowConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(ScreenflowConfig::default());
        }
    };
    load_config_from(&path)
}

/// Load config from an explicit path, generating a default if it is missing.
pub fn load_config_from(path: &Path) -> Result<ScreenflowConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(ScreenflowConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ScreenflowConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

const DEFAULT_CONFIG_CONTENT: &str = r#"# Screenflow Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# start_screen = "home"              # "home", "editor" or "counter"
# log_file = "screenflow.log"        # Or set SCREENFLOW_LOG_FILE env var
# log_level = "info"                 # "off", "error", "warn", "info", "debug", "trace"

# [flow]
# worker_name = "screenflow-apply"   # Name of the thread that applies screens
"#;

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG_CONTENT) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &ScreenflowConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Start screen: CLI → env → config → none (home screen)
    let start_screen = cli
        .start_screen
        .clone()
        .or_else(|| std::env::var("SCREENFLOW_START_SCREEN").ok())
        .or_else(|| config.general.start_screen.clone());

    // Log file: CLI → env → config → default
    let log_file = cli
        .log_file
        .clone()
        .or_else(|| std::env::var("SCREENFLOW_LOG_FILE").ok())
        .or_else(|| config.general.log_file.clone())
        .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());

    // Log level: CLI → env → config → default
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| std::env::var("SCREENFLOW_LOG_LEVEL").ok())
        .or_else(|| config.general.log_level.clone())
        .map(|level| parse_level(&level))
        .unwrap_or(DEFAULT_LOG_LEVEL);

    // Worker thread name: env → config → default
    let worker_name = std::env::var("SCREENFLOW_WORKER_NAME")
        .ok()
        .or_else(|| config.flow.worker_name.clone())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_WORKER_NAME.to_string());

    ResolvedConfig {
        start_screen,
        log_file: PathBuf::from(log_file),
        log_level,
        worker_name,
    }
}

/// Parses a level name, falling back to the default for anything unknown.
fn parse_level(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or_else(|_| {
        warn!("Unknown log level '{}', using {}", level, DEFAULT_LOG_LEVEL);
        DEFAULT_LOG_LEVEL
    })
}
