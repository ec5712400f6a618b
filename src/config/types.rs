//! Configuration types for repotree.
//!
//! This module defines the structures used to represent application
//! configuration as parsed from an INI-format config file.

use std::path::PathBuf;

use crate::locate::ShowIn;

// =============================================================================
// Config Sections
// =============================================================================

/// [api] section - platform API endpoint and credential.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the platform API.
    pub root: String,
    /// Access token attached to every request when present.
    pub token: Option<String>,
}

/// [tree] section - tree loading preferences.
#[derive(Debug, Clone)]
pub struct TreeConfig {
    /// Load the whole tree up front when the repository allows it.
    pub load_entire_tree: bool,
    /// In pull-request views, show only the changed files.
    pub diff_only: bool,
    /// Which page views the tree is shown in.
    pub show_in: ShowIn,
}

/// [state] section - persisted state location.
#[derive(Debug, Clone)]
pub struct StateConfig {
    /// Path of the JSON state file (truncation cache and friends).
    pub file: PathBuf,
}

// =============================================================================
// Top-Level Config
// =============================================================================

/// Complete application configuration as parsed from config file.
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub tree: TreeConfig,
    pub state: StateConfig,
}
