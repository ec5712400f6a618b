//! Platform adapter boundary.
//!
//! Everything platform-specific about talking to the hosting site's API
//! sits behind [`TreeProvider`]; the transformer, normalizer and
//! synchronizer never see it. Additional hosting platforms implement the
//! same trait without touching the rest of the core.

mod github;
mod memory;
mod types;

use async_trait::async_trait;
use thiserror::Error;

use crate::locate::RepoRef;

pub use github::{GitHubProvider, DEFAULT_API_ROOT};
pub use memory::MemoryProvider;
pub use types::{BlobResponse, PullFile, RepoMetadata, TreeEntry, TreeResponse};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while talking to the platform API.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested object does not exist.
    #[error("not found")]
    NotFound,

    /// The API answered with a non-success status.
    #[error("unexpected status: {0}")]
    Status(u16),

    /// Transport-level failure (connection, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

// =============================================================================
// TreeProvider Trait
// =============================================================================

/// Fetch operations a hosting platform must supply.
///
/// All operations are asynchronous and side-effect free on the caller's
/// state; the caller decides what to do with truncation flags and
/// missing objects.
#[async_trait]
pub trait TreeProvider: Send + Sync {
    /// Fetch a tree listing for the given ref or object id.
    ///
    /// With `recursive`, the whole tree is requested in one response; the
    /// response's `truncated` flag reports whether the API cut it off.
    async fn fetch_tree(
        &self,
        repo: &RepoRef,
        reference: &str,
        recursive: bool,
    ) -> Result<TreeResponse>;

    /// Fetch the flat changed-file listing of a pull request.
    ///
    /// Only the first page (300 files) is requested.
    async fn fetch_diff(&self, repo: &RepoRef, pull_id: &str) -> Result<Vec<PullFile>>;

    /// Fetch a blob object by id.
    async fn fetch_blob(&self, repo: &RepoRef, sha: &str) -> Result<BlobResponse>;

    /// Fetch repository metadata (default branch).
    async fn fetch_metadata(&self, owner: &str, name: &str) -> Result<RepoMetadata>;
}
