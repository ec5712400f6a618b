//! Tree source: truncation-aware listing fetches.
//!
//! Normalizes the two remote shapes (a full tree listing and a
//! pull-request diff listing) into one flat node-list form, and records
//! repositories whose full listings come back truncated so later loads
//! can go straight to lazy per-folder fetching.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::locate::RepoRef;
use crate::provider::{ProviderError, TreeProvider};
use crate::store::{StateStoreError, TruncationCache};

use super::diff::diff_to_nodes;
use super::node::Node;
use super::submodules::parse_manifest_blob;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while fetching a tree.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The full listing exceeded the API's size limit. The repository has
    /// been marked huge; the caller should retry in lazy mode.
    #[error("full listing truncated by the API")]
    Truncated,

    /// The repository reference carries no resolved branch.
    #[error("repository reference carries no branch")]
    MissingBranch,

    /// Platform API failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Persisted state failure.
    #[error(transparent)]
    Store(#[from] StateStoreError),
}

/// Result type for tree source operations.
pub type Result<T> = std::result::Result<T, SourceError>;

// =============================================================================
// TreeSource
// =============================================================================

/// Fetches tree listings through a platform provider.
pub struct TreeSource {
    provider: Arc<dyn TreeProvider>,
    truncation: Arc<TruncationCache>,
}

impl TreeSource {
    /// Create a tree source over the given provider and truncation cache.
    pub fn new(provider: Arc<dyn TreeProvider>, truncation: Arc<TruncationCache>) -> Self {
        Self {
            provider,
            truncation,
        }
    }

    /// Fetch a flat node list for the repository.
    ///
    /// In pull-request mode the diff listing is transformed into
    /// synthesized file-and-folder nodes (`node` is ignored: diff listings
    /// are always flattened then reconstructed). Otherwise a `None` node
    /// or `want_full` requests the whole tree recursively; a truncated
    /// response marks the repository huge and fails with
    /// [`SourceError::Truncated`] so the caller can retry lazily. With a
    /// node, only that folder's immediate children are listed.
    pub async fn fetch(
        &self,
        repo: &RepoRef,
        node: Option<&Node>,
        want_full: bool,
    ) -> Result<Vec<Node>> {
        if let Some(pull_id) = &repo.pull_request {
            let files = self.provider.fetch_diff(repo, pull_id).await?;
            debug!(repo = %repo.key(), pull = %pull_id, files = files.len(), "fetched diff listing");
            return Ok(diff_to_nodes(&files));
        }

        let branch = repo.branch.as_deref().ok_or(SourceError::MissingBranch)?;

        let mut nodes = match node {
            Some(node) if !want_full => {
                let reference = node.id.as_deref().unwrap_or(branch);
                let response = self.provider.fetch_tree(repo, reference, false).await?;
                response
                    .tree
                    .iter()
                    .map(|entry| Node::from_entry(entry, Some(&node.path)))
                    .collect::<Vec<_>>()
            }
            _ => {
                let response = self.provider.fetch_tree(repo, branch, true).await?;
                if response.truncated {
                    warn!(repo = %repo.key(), "full listing truncated, marking repository huge");
                    self.truncation.mark_huge(&repo.key()).await?;
                    return Err(SourceError::Truncated);
                }
                response
                    .tree
                    .iter()
                    .map(|entry| Node::from_entry(entry, None))
                    .collect::<Vec<_>>()
            }
        };

        self.augment_submodules(repo, &mut nodes).await;
        Ok(nodes)
    }

    /// Attach submodule link metadata from the manifest, if one is listed.
    ///
    /// Only the repository-root `.gitmodules` is a manifest; nested copies
    /// describe nested repositories and are left alone. Purely additive: an
    /// absent or unreadable manifest never fails the primary fetch.
    async fn augment_submodules(&self, repo: &RepoRef, nodes: &mut [Node]) {
        let manifest_sha = nodes
            .iter()
            .find(|n| n.path.eq_ignore_ascii_case(".gitmodules"))
            .and_then(|n| n.id.clone());
        let Some(sha) = manifest_sha else {
            return;
        };

        let blob = match self.provider.fetch_blob(repo, &sha).await {
            Ok(blob) => blob,
            Err(ProviderError::NotFound) => return,
            Err(e) => {
                warn!(repo = %repo.key(), error = %e, "submodule manifest fetch failed");
                return;
            }
        };

        let links = match parse_manifest_blob(&blob.content) {
            Ok(links) => links,
            Err(e) => {
                warn!(repo = %repo.key(), error = %e, "submodule manifest unreadable");
                return;
            }
        };

        for node in nodes.iter_mut() {
            if let Some(url) = links.get(&node.path) {
                node.submodule_url = Some(url.clone());
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MemoryProvider, PullFile, TreeEntry};
    use crate::store::{ManualClock, MemoryStateStore};
    use crate::tree::node::NodeKind;

    fn repo(branch: Option<&str>, pull: Option<&str>) -> RepoRef {
        RepoRef {
            owner: "owner".to_string(),
            name: "repo".to_string(),
            branch: branch.map(|s| s.to_string()),
            pull_request: pull.map(|s| s.to_string()),
        }
    }

    fn entry(path: &str, entry_type: &str, sha: &str) -> TreeEntry {
        TreeEntry {
            path: path.to_string(),
            entry_type: entry_type.to_string(),
            sha: Some(sha.to_string()),
            url: None,
        }
    }

    fn source(provider: MemoryProvider) -> (Arc<TruncationCache>, TreeSource) {
        let truncation = Arc::new(TruncationCache::new(
            Arc::new(MemoryStateStore::new()),
            Arc::new(ManualClock::new(0)),
        ));
        let source = TreeSource::new(Arc::new(provider), truncation.clone());
        (truncation, source)
    }

    #[tokio::test]
    async fn test_full_fetch() {
        let provider = MemoryProvider::new().with_listing(
            "main",
            true,
            vec![entry("src", "tree", "t1"), entry("src/lib.rs", "blob", "b1")],
        );
        let (_, source) = source(provider);

        let nodes = source.fetch(&repo(Some("main"), None), None, true).await.unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].kind, NodeKind::Folder);
        assert_eq!(nodes[1].path, "src/lib.rs");
    }

    #[tokio::test]
    async fn test_truncated_marks_huge_and_fails() {
        let provider = MemoryProvider::new().with_truncated_listing(
            "main",
            true,
            vec![entry("src", "tree", "t1")],
        );
        let (truncation, source) = source(provider);

        let result = source.fetch(&repo(Some("main"), None), None, true).await;
        assert!(matches!(result, Err(SourceError::Truncated)));
        assert!(truncation.is_marked_huge("owner/repo").await.unwrap());
    }

    #[tokio::test]
    async fn test_lazy_fetch_prefixes_parent_path() {
        let provider = MemoryProvider::new()
            .with_listing("t1", false, vec![entry("lib.rs", "blob", "b1")]);
        let (_, source) = source(provider);

        let mut folder = Node::folder("src");
        folder.id = Some("t1".to_string());

        let nodes = source
            .fetch(&repo(Some("main"), None), Some(&folder), false)
            .await
            .unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].path, "src/lib.rs");
    }

    #[tokio::test]
    async fn test_pull_request_mode_transforms_diff() {
        let provider = MemoryProvider::new().with_diff(
            "42",
            vec![PullFile {
                filename: "src/x.js".to_string(),
                status: "modified".to_string(),
                additions: 3,
                deletions: 1,
                sha: Some("b1".to_string()),
                previous_filename: None,
                blob_url: None,
            }],
        );
        let (_, source) = source(provider);

        let nodes = source
            .fetch(&repo(Some("main"), Some("42")), None, true)
            .await
            .unwrap();
        let paths: Vec<&str> = nodes.iter().map(|n| n.path.as_str()).collect();
        assert_eq!(paths, vec!["src", "src/x.js"]);
        assert!(nodes[0].diff.is_some());
    }

    #[tokio::test]
    async fn test_missing_branch_rejected() {
        let (_, source) = source(MemoryProvider::new());
        let result = source.fetch(&repo(None, None), None, true).await;
        assert!(matches!(result, Err(SourceError::MissingBranch)));
    }

    #[tokio::test]
    async fn test_submodule_augmentation() {
        let manifest = "[submodule \"dep\"]\n\tpath = vendor/dep\n\turl = https://example.invalid/dep.git\n";
        let provider = MemoryProvider::new()
            .with_listing(
                "main",
                true,
                vec![
                    entry(".gitmodules", "blob", "m1"),
                    entry("vendor", "tree", "t1"),
                    entry("vendor/dep", "commit", "c1"),
                ],
            )
            .with_blob("m1", manifest);
        let (_, source) = source(provider);

        let nodes = source.fetch(&repo(Some("main"), None), None, true).await.unwrap();
        let dep = nodes.iter().find(|n| n.path == "vendor/dep").unwrap();
        assert_eq!(
            dep.submodule_url.as_deref(),
            Some("https://example.invalid/dep.git")
        );
    }

    #[tokio::test]
    async fn test_nested_gitmodules_is_not_the_manifest() {
        let manifest = "[submodule \"dep\"]\n\tpath = vendor/dep\n\turl = https://example.invalid/dep.git\n";
        let provider = MemoryProvider::new()
            .with_listing(
                "main",
                true,
                vec![
                    entry("foo", "tree", "t0"),
                    entry("foo/.gitmodules", "blob", "m1"),
                    entry("vendor", "tree", "t1"),
                    entry("vendor/dep", "commit", "c1"),
                ],
            )
            .with_blob("m1", manifest);
        let (_, source) = source(provider);

        let nodes = source.fetch(&repo(Some("main"), None), None, true).await.unwrap();
        assert!(nodes.iter().all(|n| n.submodule_url.is_none()));
    }

    #[tokio::test]
    async fn test_missing_manifest_blob_is_not_an_error() {
        // The listing names a .gitmodules entry but the blob is absent.
        let provider = MemoryProvider::new().with_listing(
            "main",
            true,
            vec![entry(".gitmodules", "blob", "m1"), entry("src", "tree", "t1")],
        );
        let (_, source) = source(provider);

        let nodes = source.fetch(&repo(Some("main"), None), None, true).await.unwrap();
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|n| n.submodule_url.is_none()));
    }
}
