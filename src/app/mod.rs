//! Application orchestration.
//!
//! Ties the locator, tree source and normalizer together into the
//! operations a frontend drives: build a tree snapshot for a repository,
//! expand a folder, and synchronize the selection with a path.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::TreeConfig;
use crate::locate::RepoRef;
use crate::store::{StateStoreError, TruncationCache};
use crate::sync::{SelectionSync, SnapshotFront, SyncError, SyncOutcome, TreeFront};
use crate::tree::node::Node;
use crate::tree::normalize::{collapse_nodes, sort_nodes};
use crate::tree::source::{SourceError, TreeSource};
use crate::tree::assemble;

// =============================================================================
// Error Types
// =============================================================================

/// Errors surfaced by the application layer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StateStoreError),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;

// =============================================================================
// Snapshot
// =============================================================================

/// One rendered tree: the repository it shows and its root nodes.
///
/// Snapshots are not shared; each `show_tree` call builds a fresh one and
/// the previous snapshot is discarded wholesale.
#[derive(Debug)]
pub struct Snapshot {
    pub repo: RepoRef,
    pub roots: Vec<Node>,
    /// Whether every node is resident, or folders load lazily.
    pub fully_loaded: bool,
}

/// Result of a selection sync run against a snapshot.
#[derive(Debug)]
pub struct SyncReport {
    pub outcome: SyncOutcome,
    /// Paths selected, in selection order.
    pub selected: Vec<String>,
}

// =============================================================================
// TreeService
// =============================================================================

/// Builds and maintains tree snapshots for repositories.
pub struct TreeService {
    source: TreeSource,
    truncation: Arc<TruncationCache>,
    prefs: TreeConfig,
}

impl TreeService {
    pub fn new(source: TreeSource, truncation: Arc<TruncationCache>, prefs: TreeConfig) -> Self {
        Self {
            source,
            truncation,
            prefs,
        }
    }

    /// Build a fresh snapshot for the repository.
    ///
    /// Pull-request snapshots always load fully from the diff listing;
    /// otherwise the whole tree is loaded up front when the repository is
    /// not marked huge and the load-entire-tree preference asks for it.
    /// A truncated full listing falls back to a
    /// lazy one-level root load (the listing call itself marks the
    /// repository huge for later visits). Siblings are always sorted;
    /// single-child folder chains collapse only in fully-loaded trees.
    pub async fn show_tree(&self, repo: &RepoRef) -> Result<Snapshot> {
        let pr_mode = repo.pull_request.is_some();
        let can_load_all = !self.truncation.is_marked_huge(&repo.key()).await?;
        // Diff listings are complete by construction; the huge-repo mark
        // only gates full tree listings.
        let load_all = pr_mode || (can_load_all && self.prefs.load_entire_tree);

        let (flat, fully_loaded) = if load_all {
            match self.source.fetch(repo, None, true).await {
                Ok(flat) => (flat, true),
                Err(SourceError::Truncated) => {
                    info!(repo = %repo.key(), "falling back to lazy loading");
                    (self.fetch_root_level(repo).await?, false)
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            (self.fetch_root_level(repo).await?, false)
        };

        let roots = if fully_loaded {
            let mut roots = assemble(flat);
            sort_nodes(&mut roots);
            collapse_nodes(roots)
        } else {
            // A one-level listing has no nesting to assemble and keeps
            // its folders' children unloaded.
            let mut roots = flat;
            sort_nodes(&mut roots);
            roots
        };

        debug!(repo = %repo.key(), roots = roots.len(), fully_loaded, "snapshot built");
        Ok(Snapshot {
            repo: repo.clone(),
            roots,
            fully_loaded,
        })
    }

    /// Expand one folder of a lazy snapshot, fetching its children if
    /// they are not yet materialized.
    pub async fn expand(&self, snapshot: &mut Snapshot, path: &str) -> Result<()> {
        let repo = snapshot.repo.clone();
        let mut front = SnapshotFront::new(&repo, &self.source, &mut snapshot.roots);
        front.expand(path).await?;
        Ok(())
    }

    /// Synchronize the snapshot's selection with a repository-relative
    /// path, expanding lazy folders along the way.
    pub async fn sync_selection(&self, snapshot: &mut Snapshot, path: &str) -> Result<SyncReport> {
        let repo = snapshot.repo.clone();
        let fully_loaded = snapshot.fully_loaded;
        let mut front = SnapshotFront::new(&repo, &self.source, &mut snapshot.roots);
        let mut sync = SelectionSync::new();
        let outcome = sync.run(&mut front, path, fully_loaded).await?;
        Ok(SyncReport {
            outcome,
            selected: front.selected().to_vec(),
        })
    }

    async fn fetch_root_level(&self, repo: &RepoRef) -> std::result::Result<Vec<Node>, SourceError> {
        // The repository root is a folder with an empty path and no sha;
        // the source lists it one level deep off the branch ref.
        let root = Node::folder("");
        self.source.fetch(repo, Some(&root), false).await
    }
}

// =============================================================================
// Tests
// =============================================================================
