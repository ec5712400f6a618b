//! Wire types for the hosting platform's repository API.

use serde::{Deserialize, Serialize};

/// One page of a tree listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeResponse {
    /// The listed entries.
    pub tree: Vec<TreeEntry>,
    /// Whether the listing was cut off because the true listing exceeds
    /// the API's internal size limit.
    #[serde(default)]
    pub truncated: bool,
}

/// One entry of a tree listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Path of the entry, relative to the listed tree.
    pub path: String,
    /// Entry type: `blob`, `tree` or `commit` (submodule).
    #[serde(rename = "type")]
    pub entry_type: String,
    /// Object id of the entry.
    #[serde(default)]
    pub sha: Option<String>,
    /// API URL of the entry.
    #[serde(default)]
    pub url: Option<String>,
}

/// One changed file of a pull-request diff listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullFile {
    /// Path of the changed file.
    pub filename: String,
    /// Change status reported by the API (`added`, `modified`, ...).
    pub status: String,
    /// Added line count.
    pub additions: u64,
    /// Deleted line count.
    pub deletions: u64,
    /// Blob id after the change, when available.
    #[serde(default)]
    pub sha: Option<String>,
    /// Prior path for renamed files.
    #[serde(default)]
    pub previous_filename: Option<String>,
    /// External link to the changed file.
    #[serde(default)]
    pub blob_url: Option<String>,
}

/// A blob object, carrying base64-encoded content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobResponse {
    /// Base64 content, possibly wrapped with newlines.
    pub content: String,
    /// Content encoding; the API reports `base64`.
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Repository metadata, used as the default-branch fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoMetadata {
    /// The repository's default branch, if reported.
    #[serde(default)]
    pub default_branch: Option<String>,
}
