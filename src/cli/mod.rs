//! Command-line interface for repotree.

mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::warn;

use crate::app::{AppError, TreeService};
use crate::config::{read_config, ConfigError, ConfigSource};
use crate::provider::{GitHubProvider, ProviderError, TreeProvider};
use crate::store::{JsonFileStateStore, SystemClock, TruncationCache};
use crate::tree::source::TreeSource;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during CLI execution.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// App error.
    #[error("{0}")]
    App(#[from] AppError),

    /// Platform API error.
    #[error("{0}")]
    Provider(#[from] ProviderError),

    /// Malformed repository argument.
    #[error("invalid repository '{0}' (expected owner/name)")]
    InvalidRepo(String),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

// =============================================================================
// CLI Definition
// =============================================================================

/// repotree - repository file trees from the command line.
#[derive(Parser, Debug)]
#[command(name = "repotree", version, about, long_about = None)]
pub struct Cli {
    /// Config file path (defaults to ~/.repotreerc).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a repository's file tree.
    Tree {
        /// Repository as owner/name.
        repo: String,

        /// Branch to list (defaults to the repository's default branch).
        #[arg(long)]
        branch: Option<String>,

        /// Force lazy per-folder loading.
        #[arg(long)]
        lazy: bool,

        /// Select this repository-relative path after loading, expanding
        /// folders along the way.
        #[arg(long)]
        select: Option<String>,
    },

    /// Print the changed-file tree of a pull request.
    Diff {
        /// Repository as owner/name.
        repo: String,

        /// Pull request number.
        pull: String,
    },

    /// Resolve a page pathname to a repository reference.
    Locate {
        /// Pathname such as /owner/name/tree/main/src.
        pathname: String,
    },
}

// =============================================================================
// CLI Execution
// =============================================================================

impl Cli {
    /// Parse command-line arguments and return the CLI instance.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Run the CLI command.
    pub async fn run(self) -> Result<()> {
        let source = ConfigSource {
            config_file: self.config.clone(),
        };
        let result = read_config(&source)?;
        for warning in &result.warnings {
            warn!("{}", warning);
        }
        let config = result.config;

        let provider: Arc<dyn TreeProvider> = Arc::new(GitHubProvider::with_api_root(
            &config.api.root,
            config.api.token.clone(),
        ));
        let truncation = Arc::new(TruncationCache::new(
            Arc::new(JsonFileStateStore::new(&config.state.file)),
            Arc::new(SystemClock),
        ));
        let service = |prefs| {
            TreeService::new(
                TreeSource::new(provider.clone(), truncation.clone()),
                truncation.clone(),
                prefs,
            )
        };

        match self.command {
            Command::Tree {
                repo,
                branch,
                lazy,
                select,
            } => {
                let mut prefs = config.tree.clone();
                if lazy {
                    prefs.load_entire_tree = false;
                }
                commands::run_tree(&service(prefs), provider.clone(), &repo, branch, select).await
            }
            Command::Diff { repo, pull } => {
                commands::run_diff(&service(config.tree.clone()), &repo, &pull).await
            }
            Command::Locate { pathname } => {
                commands::run_locate(provider.clone(), &config, &pathname).await
            }
        }
    }
}

/// Main entry point for the CLI.
pub async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli.run().await
}
