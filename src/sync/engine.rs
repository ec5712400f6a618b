//! Path-to-node selection synchronization.
//!
//! After a navigation the rendered tree must highlight the node the page
//! is showing. A fully-loaded tree holds every node already, so the path
//! selects directly. An incrementally-loaded tree is walked one prefix
//! level at a time, expanding as it goes; a prefix the tree does not hold
//! ends the walk silently.

use thiserror::Error;
use tracing::debug;

use crate::tree::source::SourceError;

use super::front::TreeFront;

/// Errors that can occur while synchronizing a selection.
///
/// A missing prefix is not among them: the walk stalls, it does not fail.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A lazy expansion fetch failed.
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Where an expansion chain currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No chain running.
    Idle,
    /// Awaiting expansion of the prefix at this index.
    Expanding(usize),
    /// The full path was selected.
    Done,
    /// A prefix was absent; the walk stopped there.
    Stalled,
}

/// How a completed chain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The target path itself was selected.
    Done,
    /// The walk stopped at this prefix depth (0-based) without error.
    Stalled { depth: usize },
}

/// Drives one selection chain against a [`TreeFront`].
pub struct SelectionSync {
    state: SyncState,
}

impl SelectionSync {
    pub fn new() -> Self {
        Self {
            state: SyncState::Idle,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Synchronize the front's selection with `path`.
    ///
    /// In fully-loaded mode the path selects directly when present. In
    /// incremental mode every prefix from shallowest to deepest is
    /// selected and expanded in turn, awaiting each expansion before the
    /// next step; an absent prefix stops the walk without error.
    pub async fn run(
        &mut self,
        front: &mut dyn TreeFront,
        path: &str,
        fully_loaded: bool,
    ) -> Result<SyncOutcome, SyncError> {
        front.deselect_all();

        if fully_loaded {
            if front.contains(path) {
                front.select(path);
                self.state = SyncState::Done;
                return Ok(SyncOutcome::Done);
            }
            debug!(path, "selection target absent from loaded tree");
            self.state = SyncState::Stalled;
            return Ok(SyncOutcome::Stalled { depth: 0 });
        }

        let prefixes = path_prefixes(path);
        let last = prefixes.len().saturating_sub(1);
        for (depth, prefix) in prefixes.iter().enumerate() {
            self.state = SyncState::Expanding(depth);
            if !front.contains(prefix) {
                debug!(path, prefix = prefix.as_str(), "prefix absent, stopping walk");
                self.state = SyncState::Stalled;
                return Ok(SyncOutcome::Stalled { depth });
            }
            front.select(prefix);
            if depth < last {
                front.expand(prefix).await?;
            }
        }

        self.state = SyncState::Done;
        Ok(SyncOutcome::Done)
    }
}

impl Default for SelectionSync {
    fn default() -> Self {
        Self::new()
    }
}

/// Every non-empty prefix of a path, shallowest to deepest.
///
/// `a/b/c` yields `a`, `a/b`, `a/b/c`. The empty path yields nothing.
pub fn path_prefixes(path: &str) -> Vec<String> {
    if path.is_empty() {
        return Vec::new();
    }
    let mut prefixes = Vec::new();
    let mut end = 0;
    for component in path.split('/') {
        end += component.len();
        prefixes.push(path[..end].to_string());
        end += 1; // the separator
    }
    prefixes
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;

    /// A scripted front: a fixed set of present paths, recorded actions.
    struct ScriptedFront {
        present: HashSet<String>,
        selected: Vec<String>,
        expanded: Vec<String>,
    }

    impl ScriptedFront {
        fn with_paths(paths: &[&str]) -> Self {
            Self {
                present: paths.iter().map(|p| p.to_string()).collect(),
                selected: Vec::new(),
                expanded: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl TreeFront for ScriptedFront {
        fn contains(&self, path: &str) -> bool {
            self.present.contains(path)
        }

        fn deselect_all(&mut self) {
            self.selected.clear();
        }

        fn select(&mut self, path: &str) {
            self.selected.push(path.to_string());
        }

        async fn expand(&mut self, path: &str) -> Result<(), SourceError> {
            self.expanded.push(path.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_path_prefixes() {
        assert_eq!(path_prefixes("a/b/c"), vec!["a", "a/b", "a/b/c"]);
        assert_eq!(path_prefixes("top.rs"), vec!["top.rs"]);
        assert!(path_prefixes("").is_empty());
    }

    #[tokio::test]
    async fn test_incremental_walks_to_target() {
        let mut front = ScriptedFront::with_paths(&["a", "a/b", "a/b/c"]);
        let mut sync = SelectionSync::new();

        let outcome = sync.run(&mut front, "a/b/c", false).await.unwrap();
        assert_eq!(outcome, SyncOutcome::Done);
        assert_eq!(sync.state(), SyncState::Done);
        assert_eq!(front.selected, vec!["a", "a/b", "a/b/c"]);
        // The target itself is selected, never expanded.
        assert_eq!(front.expanded, vec!["a", "a/b"]);
    }

    #[tokio::test]
    async fn test_incremental_stalls_silently_on_missing_prefix() {
        let mut front = ScriptedFront::with_paths(&["a", "a/b"]);
        let mut sync = SelectionSync::new();

        let outcome = sync.run(&mut front, "a/b/c", false).await.unwrap();
        assert_eq!(outcome, SyncOutcome::Stalled { depth: 2 });
        assert_eq!(sync.state(), SyncState::Stalled);
        assert_eq!(front.selected, vec!["a", "a/b"]);
    }

    #[tokio::test]
    async fn test_incremental_stalls_at_first_prefix() {
        let mut front = ScriptedFront::with_paths(&["other"]);
        let mut sync = SelectionSync::new();

        let outcome = sync.run(&mut front, "a/b", false).await.unwrap();
        assert_eq!(outcome, SyncOutcome::Stalled { depth: 0 });
        assert!(front.selected.is_empty());
        assert!(front.expanded.is_empty());
    }

    #[tokio::test]
    async fn test_fully_loaded_selects_directly() {
        let mut front = ScriptedFront::with_paths(&["a/b/c"]);
        let mut sync = SelectionSync::new();

        let outcome = sync.run(&mut front, "a/b/c", true).await.unwrap();
        assert_eq!(outcome, SyncOutcome::Done);
        assert_eq!(front.selected, vec!["a/b/c"]);
        assert!(front.expanded.is_empty());
    }

    #[tokio::test]
    async fn test_fully_loaded_missing_target_stalls() {
        let mut front = ScriptedFront::with_paths(&[]);
        let mut sync = SelectionSync::new();

        let outcome = sync.run(&mut front, "gone.rs", true).await.unwrap();
        assert_eq!(outcome, SyncOutcome::Stalled { depth: 0 });
        assert!(front.selected.is_empty());
    }

    #[tokio::test]
    async fn test_previous_selection_cleared() {
        let mut front = ScriptedFront::with_paths(&["a"]);
        front.selected.push("stale".to_string());
        let mut sync = SelectionSync::new();

        sync.run(&mut front, "a", false).await.unwrap();
        assert_eq!(front.selected, vec!["a"]);
    }
}
