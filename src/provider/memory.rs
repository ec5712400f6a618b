//! An in-memory implementation of [`TreeProvider`], intended primarily
//! for testing and for exercising the pipeline without network access.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::locate::RepoRef;

use super::types::{BlobResponse, PullFile, RepoMetadata, TreeEntry, TreeResponse};
use super::{ProviderError, Result, TreeProvider};

#[derive(Default)]
struct Inner {
    /// Listings keyed by `(reference, recursive)`.
    listings: HashMap<(String, bool), TreeResponse>,
    /// Diff listings keyed by pull id.
    diffs: HashMap<String, Vec<PullFile>>,
    /// Blobs keyed by object id; stored as already-base64 content.
    blobs: HashMap<String, String>,
    /// Default branches keyed by `owner/name`.
    default_branches: HashMap<String, String>,
    metadata_fetches: usize,
    tree_fetches: usize,
}

/// A canned-response provider backed by in-memory maps.
#[derive(Default)]
pub struct MemoryProvider {
    inner: RwLock<Inner>,
}

impl MemoryProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tree listing for a `(reference, recursive)` request.
    pub fn with_listing(
        self,
        reference: &str,
        recursive: bool,
        entries: Vec<TreeEntry>,
    ) -> Self {
        {
            let mut inner = self.inner.write().unwrap();
            inner.listings.insert(
                (reference.to_string(), recursive),
                TreeResponse {
                    tree: entries,
                    truncated: false,
                },
            );
        }
        self
    }

    /// Add a truncated listing: the response carries the given partial
    /// entries with the truncation flag set.
    pub fn with_truncated_listing(
        self,
        reference: &str,
        recursive: bool,
        entries: Vec<TreeEntry>,
    ) -> Self {
        {
            let mut inner = self.inner.write().unwrap();
            inner.listings.insert(
                (reference.to_string(), recursive),
                TreeResponse {
                    tree: entries,
                    truncated: true,
                },
            );
        }
        self
    }

    /// Add a pull-request diff listing.
    pub fn with_diff(self, pull_id: &str, files: Vec<PullFile>) -> Self {
        {
            let mut inner = self.inner.write().unwrap();
            inner.diffs.insert(pull_id.to_string(), files);
        }
        self
    }

    /// Add a blob with raw content; it is stored base64-encoded the way
    /// the real API returns it, wrapped with newlines.
    pub fn with_blob(self, sha: &str, content: &str) -> Self {
        use base64::Engine as _;
        let encoded = base64::engine::general_purpose::STANDARD.encode(content);
        // The live API wraps base64 bodies at 60 columns.
        let wrapped = encoded
            .as_bytes()
            .chunks(60)
            .map(|chunk| std::str::from_utf8(chunk).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        {
            let mut inner = self.inner.write().unwrap();
            inner.blobs.insert(sha.to_string(), wrapped);
        }
        self
    }

    /// Set the default branch reported for a repository key.
    pub fn with_default_branch(self, repo_key: &str, branch: &str) -> Self {
        {
            let mut inner = self.inner.write().unwrap();
            inner
                .default_branches
                .insert(repo_key.to_string(), branch.to_string());
        }
        self
    }

    /// Number of metadata requests served so far.
    pub fn metadata_fetches(&self) -> usize {
        self.inner.read().unwrap().metadata_fetches
    }

    /// Number of tree listing requests served so far.
    pub fn tree_fetches(&self) -> usize {
        self.inner.read().unwrap().tree_fetches
    }
}

#[async_trait]
impl TreeProvider for MemoryProvider {
    async fn fetch_tree(
        &self,
        _repo: &RepoRef,
        reference: &str,
        recursive: bool,
    ) -> Result<TreeResponse> {
        let mut inner = self.inner.write().unwrap();
        inner.tree_fetches += 1;
        inner
            .listings
            .get(&(reference.to_string(), recursive))
            .cloned()
            .ok_or(ProviderError::NotFound)
    }

    async fn fetch_diff(&self, _repo: &RepoRef, pull_id: &str) -> Result<Vec<PullFile>> {
        let inner = self.inner.read().unwrap();
        inner
            .diffs
            .get(pull_id)
            .cloned()
            .ok_or(ProviderError::NotFound)
    }

    async fn fetch_blob(&self, _repo: &RepoRef, sha: &str) -> Result<BlobResponse> {
        let inner = self.inner.read().unwrap();
        inner
            .blobs
            .get(sha)
            .map(|content| BlobResponse {
                content: content.clone(),
                encoding: Some("base64".to_string()),
            })
            .ok_or(ProviderError::NotFound)
    }

    async fn fetch_metadata(&self, owner: &str, name: &str) -> Result<RepoMetadata> {
        let mut inner = self.inner.write().unwrap();
        inner.metadata_fetches += 1;
        let key = format!("{}/{}", owner, name);
        Ok(RepoMetadata {
            default_branch: inner.default_branches.get(&key).cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepoRef {
        RepoRef {
            owner: "owner".to_string(),
            name: "repo".to_string(),
            branch: Some("main".to_string()),
            pull_request: None,
        }
    }

    #[tokio::test]
    async fn test_listing_roundtrip() {
        let provider = MemoryProvider::new().with_listing(
            "main",
            true,
            vec![TreeEntry {
                path: "src".to_string(),
                entry_type: "tree".to_string(),
                sha: Some("t1".to_string()),
                url: None,
            }],
        );

        let response = provider.fetch_tree(&repo(), "main", true).await.unwrap();
        assert_eq!(response.tree.len(), 1);
        assert!(!response.truncated);

        // The non-recursive variant was not registered.
        let missing = provider.fetch_tree(&repo(), "main", false).await;
        assert!(matches!(missing, Err(ProviderError::NotFound)));
    }

    #[tokio::test]
    async fn test_blob_is_base64_wrapped() {
        let provider = MemoryProvider::new().with_blob("s1", "hello");
        let blob = provider.fetch_blob(&repo(), "s1").await.unwrap();
        assert_eq!(blob.encoding.as_deref(), Some("base64"));

        use base64::Engine as _;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(blob.content.replace('\n', ""))
            .unwrap();
        assert_eq!(decoded, b"hello");
    }
}
