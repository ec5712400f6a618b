//! Configuration file reading and parsing.
//!
//! This module handles locating, reading, and parsing the INI-format
//! configuration file, with environment-variable overrides for the
//! file location and the access token.

use std::env;
use std::path::{Path, PathBuf};

use configparser::ini::Ini;
use thiserror::Error;

use crate::locate::ShowIn;
use crate::provider::DEFAULT_API_ROOT;

use super::{ApiConfig, Config, StateConfig, TreeConfig};

// =============================================================================
// Constants - Default Values
// =============================================================================

const DEFAULT_LOAD_ENTIRE_TREE: bool = true;
const DEFAULT_DIFF_ONLY: bool = false;
const DEFAULT_STATE_FILENAME: &str = ".repotree-state.json";

const ENV_CONFIG_FILE: &str = "REPOTREE_CONFIG_FILE";
const ENV_TOKEN: &str = "REPOTREE_TOKEN";
const DEFAULT_CONFIG_FILENAME: &str = ".repotreerc";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid boolean '{value}' for key '{key}'")]
    InvalidBoolean { key: String, value: String },

    #[error("invalid value '{value}' for key '{key}' (expected one of: {expected})")]
    InvalidChoice {
        key: String,
        value: String,
        expected: &'static str,
    },
}

/// Result type for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// =============================================================================
// ConfigSource
// =============================================================================

/// Specifies how to locate configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    /// Explicit config file path from CLI. If specified and doesn't exist,
    /// error. If None, fall back to REPOTREE_CONFIG_FILE env var, then
    /// ~/.repotreerc.
    pub config_file: Option<PathBuf>,
}

// =============================================================================
// Value Parsing
// =============================================================================

/// Parse a boolean value.
fn parse_bool(ini: &Ini, section: &str, key: &str, default: bool) -> Result<bool> {
    match ini.get(section, key) {
        None => Ok(default),
        Some(v) => match v.to_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            _ => Err(ConfigError::InvalidBoolean {
                key: key.to_string(),
                value: v.to_string(),
            }),
        },
    }
}

/// Parse the show_in view filter.
fn parse_show_in(ini: &Ini, section: &str, key: &str, default: ShowIn) -> Result<ShowIn> {
    match ini.get(section, key) {
        None => Ok(default),
        Some(v) => match v.to_lowercase().as_str() {
            "all" => Ok(ShowIn::All),
            "code" => Ok(ShowIn::Code),
            "pulls" => Ok(ShowIn::PullRequest),
            "code-and-pulls" => Ok(ShowIn::CodeAndPullRequest),
            _ => Err(ConfigError::InvalidChoice {
                key: key.to_string(),
                value: v.to_string(),
                expected: "all, code, pulls, code-and-pulls",
            }),
        },
    }
}

// =============================================================================
// Config File Resolution
// =============================================================================

/// Information about how the config file was resolved.
#[derive(Debug)]
pub struct ResolvedConfigFile {
    /// The path to the config file, if one was found.
    pub path: Option<PathBuf>,
    /// Warning message if env var pointed to nonexistent file.
    pub warning: Option<String>,
}

/// Resolve which config file to use based on the ConfigSource and environment.
fn resolve_config_file(source: &ConfigSource) -> Result<ResolvedConfigFile> {
    // If explicit path provided, it must exist
    if let Some(ref path) = source.config_file {
        if path.exists() {
            return Ok(ResolvedConfigFile {
                path: Some(path.clone()),
                warning: None,
            });
        } else {
            return Err(ConfigError::FileNotFound(path.clone()));
        }
    }

    // Check environment variable
    if let Ok(env_path) = env::var(ENV_CONFIG_FILE) {
        let path = PathBuf::from(&env_path);
        if path.exists() {
            return Ok(ResolvedConfigFile {
                path: Some(path),
                warning: None,
            });
        } else {
            // Warn but continue with defaults
            return Ok(ResolvedConfigFile {
                path: None,
                warning: Some(format!(
                    "config file specified by {} does not exist: {}",
                    ENV_CONFIG_FILE, env_path
                )),
            });
        }
    }

    // Check ~/.repotreerc
    if let Some(home) = home_dir() {
        let default_path = home.join(DEFAULT_CONFIG_FILENAME);
        if default_path.exists() {
            return Ok(ResolvedConfigFile {
                path: Some(default_path),
                warning: None,
            });
        }
    }

    // No config file found
    Ok(ResolvedConfigFile {
        path: None,
        warning: None,
    })
}

/// Get the user's home directory.
fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME").map(PathBuf::from)
}

// =============================================================================
// Default Config
// =============================================================================

/// Create a Config with all default values.
fn default_config() -> Config {
    let state_file = home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_STATE_FILENAME);
    Config {
        api: ApiConfig {
            root: DEFAULT_API_ROOT.to_string(),
            token: None,
        },
        tree: TreeConfig {
            load_entire_tree: DEFAULT_LOAD_ENTIRE_TREE,
            diff_only: DEFAULT_DIFF_ONLY,
            show_in: ShowIn::All,
        },
        state: StateConfig { file: state_file },
    }
}

// =============================================================================
// INI Parsing
// =============================================================================

/// Apply an INI file's contents to a Config, layering on top of defaults.
fn apply_ini_to_config(config: &mut Config, ini: &Ini) -> Result<()> {
    // [api] section
    if let Some(root) = ini.get("api", "root") {
        config.api.root = root;
    }
    if let Some(token) = ini.get("api", "token") {
        config.api.token = Some(token);
    }

    // [tree] section
    config.tree.load_entire_tree = parse_bool(
        ini,
        "tree",
        "load_entire_tree",
        config.tree.load_entire_tree,
    )?;
    config.tree.diff_only = parse_bool(ini, "tree", "diff_only", config.tree.diff_only)?;
    config.tree.show_in = parse_show_in(ini, "tree", "show_in", config.tree.show_in)?;

    // [state] section
    if let Some(file) = ini.get("state", "file") {
        config.state.file = PathBuf::from(file);
    }

    Ok(())
}

/// Load and parse an INI file.
fn load_ini(path: &Path) -> Result<Ini> {
    let mut ini = Ini::new();
    ini.load(path).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e,
    })?;
    Ok(ini)
}

// =============================================================================
// Main Entry Point
// =============================================================================

/// Result of reading configuration, including any warnings.
#[derive(Debug)]
pub struct ConfigResult {
    /// The parsed configuration.
    pub config: Config,
    /// Any warnings generated during config loading.
    pub warnings: Vec<String>,
}

/// Read and parse configuration from the specified sources.
///
/// Configuration is layered in this order:
/// 1. Built-in defaults
/// 2. Config file (from CLI, env var, or ~/.repotreerc)
/// 3. REPOTREE_TOKEN environment variable (token only)
pub fn read_config(source: &ConfigSource) -> Result<ConfigResult> {
    let mut warnings = Vec::new();

    // Start with defaults
    let mut config = default_config();

    // Resolve and apply the config file
    let resolved = resolve_config_file(source)?;
    if let Some(warning) = resolved.warning {
        warnings.push(warning);
    }
    if let Some(ref path) = resolved.path {
        let ini = load_ini(path)?;
        apply_ini_to_config(&mut config, &ini)?;
    }

    // Token from environment wins over the file
    if let Ok(token) = env::var(ENV_TOKEN) {
        if !token.is_empty() {
            config.api.token = Some(token);
        }
    }

    Ok(ConfigResult { config, warnings })
}

// =============================================================================
// Tests
// =============================================================================
