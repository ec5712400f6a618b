//! GitHub API implementation of [`TreeProvider`].

use async_trait::async_trait;
use percent_encoding::{percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::locate::RepoRef;

use super::types::{BlobResponse, PullFile, RepoMetadata, TreeResponse};
use super::{ProviderError, Result, TreeProvider};

/// Public GitHub API root.
pub const DEFAULT_API_ROOT: &str = "https://api.github.com";

/// Diff listings request a single page of up to this many files.
const DIFF_PAGE_SIZE: u32 = 300;

/// A [`TreeProvider`] over the GitHub REST API.
pub struct GitHubProvider {
    http: Client,
    api_root: String,
    token: Option<String>,
}

impl GitHubProvider {
    /// Create a provider against the public API root.
    pub fn new(token: Option<String>) -> Self {
        Self::with_api_root(DEFAULT_API_ROOT, token)
    }

    /// Create a provider against a custom API root (enterprise installs).
    pub fn with_api_root(api_root: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            api_root: api_root.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Create a provider with a custom reqwest client.
    pub fn with_client(client: Client, api_root: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http: client,
            api_root: api_root.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    fn repo_url(&self, owner: &str, name: &str, suffix: &str) -> String {
        format!("{}/repos/{}/{}{}", self.api_root, owner, name, suffix)
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(%url, "api request");
        let mut request = self.http.get(url);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {}", token));
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(ProviderError::NotFound),
            status if !status.is_success() => Err(ProviderError::Status(status.as_u16())),
            _ => response
                .json::<T>()
                .await
                .map_err(|e| ProviderError::Decode(e.to_string())),
        }
    }
}

/// Percent-encode a ref for embedding in a request path.
///
/// Branch names may contain slashes and other separators; the tree
/// endpoint expects them encoded.
fn encode_ref(reference: &str) -> String {
    percent_encode(reference.as_bytes(), NON_ALPHANUMERIC).to_string()
}

#[async_trait]
impl TreeProvider for GitHubProvider {
    async fn fetch_tree(
        &self,
        repo: &RepoRef,
        reference: &str,
        recursive: bool,
    ) -> Result<TreeResponse> {
        let suffix = if recursive {
            format!("/git/trees/{}?recursive=1", encode_ref(reference))
        } else {
            format!("/git/trees/{}", encode_ref(reference))
        };
        self.get(&self.repo_url(&repo.owner, &repo.name, &suffix))
            .await
    }

    async fn fetch_diff(&self, repo: &RepoRef, pull_id: &str) -> Result<Vec<PullFile>> {
        let suffix = format!("/pulls/{}/files?per_page={}", pull_id, DIFF_PAGE_SIZE);
        self.get(&self.repo_url(&repo.owner, &repo.name, &suffix))
            .await
    }

    async fn fetch_blob(&self, repo: &RepoRef, sha: &str) -> Result<BlobResponse> {
        let suffix = format!("/git/blobs/{}", sha);
        self.get(&self.repo_url(&repo.owner, &repo.name, &suffix))
            .await
    }

    async fn fetch_metadata(&self, owner: &str, name: &str) -> Result<RepoMetadata> {
        self.get(&self.repo_url(owner, name, "")).await
    }
}
