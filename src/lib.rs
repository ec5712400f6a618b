//! repotree - a code-tree synchronization core for repository browsing.
//!
//! Turns a remote source of truth (a full tree listing or a pull-request
//! diff listing) into a normalized, navigable hierarchy, with lazy loading
//! for oversized repositories and path-to-node selection sync.

pub mod app;
pub mod cli;
pub mod config;
pub mod locate;
pub mod logging;
pub mod provider;
pub mod store;
pub mod sync;
pub mod tree;

pub use app::{AppError, Snapshot, SyncReport, TreeService};
pub use locate::{LocatorOptions, Locator, PageLocation, RepoRef, ShowIn, ViewKind};
pub use provider::{GitHubProvider, ProviderError, TreeProvider};
pub use sync::{SelectionSync, SyncOutcome, TreeFront};
pub use tree::{Node, NodeKind, TreeSource};
