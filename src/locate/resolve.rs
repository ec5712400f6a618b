//! Resolution of a page location into a repository reference.
//!
//! Turning "the page the user is looking at" into `owner/name/branch` is
//! best-effort scraping: no single signal survives long branch names,
//! pull-request views and partial page layouts, so branch resolution walks
//! an ordered fallback chain and the first non-empty result wins. The final
//! step asks the API for the repository's default branch and memoizes it.

use tracing::debug;

use crate::provider::{ProviderError, TreeProvider};
use crate::store::DefaultBranchMemo;

use super::location::{PageLocation, RepoRef, ViewKind};

// =============================================================================
// Reserved Names
// =============================================================================

/// First path segments that never denote a repository owner.
pub const RESERVED_USER_NAMES: &[&str] = &[
    "settings",
    "orgs",
    "organizations",
    "site",
    "blog",
    "about",
    "explore",
    "styleguide",
    "showcases",
    "trending",
    "stars",
    "dashboard",
    "notifications",
    "search",
    "developer",
    "account",
    "pulls",
    "issues",
    "features",
    "contact",
    "security",
    "join",
    "login",
    "watching",
    "new",
    "integrations",
    "gist",
    "business",
    "mirrors",
    "open-source",
    "personal",
    "pricing",
    "sessions",
    "topics",
    "users",
    "marketplace",
];

/// Second path segments that never denote a repository name.
pub const RESERVED_REPO_NAMES: &[&str] = &["followers", "following", "repositories"];

// =============================================================================
// Preferences
// =============================================================================

/// Which page kinds the sidebar should be resolved on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShowIn {
    /// Resolve on every page of the repository.
    #[default]
    All,
    /// Only code and commit views.
    Code,
    /// Only pull-request views.
    PullRequest,
    /// Code, commit and pull-request views.
    CodeAndPullRequest,
}

impl ShowIn {
    fn permits(&self, view: &ViewKind) -> bool {
        let is_code = view.is_code();
        let is_pr = matches!(view, ViewKind::Pull);
        match self {
            ShowIn::All => true,
            ShowIn::Code => is_code,
            ShowIn::PullRequest => is_pr,
            ShowIn::CodeAndPullRequest => is_code || is_pr,
        }
    }
}

/// Locator inputs that come from user preferences.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocatorOptions {
    /// Page kinds the sidebar is enabled on.
    pub show_in: ShowIn,
    /// Whether pull-request views should show only changed files. The
    /// pull-request id is recorded only when this is on.
    pub diff_only: bool,
}

// =============================================================================
// Locator
// =============================================================================

/// Resolves page locations into repository references.
pub struct Locator<'a> {
    provider: &'a dyn TreeProvider,
    branch_memo: &'a DefaultBranchMemo,
}

impl<'a> Locator<'a> {
    /// Create a locator over the given platform provider and branch memo.
    pub fn new(provider: &'a dyn TreeProvider, branch_memo: &'a DefaultBranchMemo) -> Self {
        Self {
            provider,
            branch_memo,
        }
    }

    /// Resolve a location into a [`RepoRef`].
    ///
    /// Returns `Ok(None)` when the location does not denote a browsable
    /// repository view (error pages, raw-content pages, reserved names,
    /// pages excluded by the show-in preference). This is "not applicable",
    /// not an error.
    pub async fn resolve(
        &self,
        location: &PageLocation,
        previous: Option<&RepoRef>,
        options: LocatorOptions,
    ) -> Result<Option<RepoRef>, ProviderError> {
        if location.error_page || location.raw_page {
            return Ok(None);
        }

        let Some(parts) = location.parts() else {
            return Ok(None);
        };

        if RESERVED_USER_NAMES.contains(&parts.owner.as_str())
            || RESERVED_REPO_NAMES.contains(&parts.name.as_str())
        {
            return Ok(None);
        }

        if !options.show_in.permits(&parts.view) {
            return Ok(None);
        }

        let key = format!("{}/{}", parts.owner, parts.name);

        // Ordered fallback chain; the first non-empty result wins. Failure
        // of any single step must not abort resolution.
        let branch = self
            .branch_from_commit_view(&parts.view, parts.view_id.as_deref())
            .or_else(|| branch_from_selector(location))
            .or_else(|| branch_from_commits_link(location, &parts.owner, &parts.name))
            .or_else(|| branch_from_base_ref(location))
            .or_else(|| branch_from_previous(previous, &parts.owner, &parts.name))
            .or_else(|| self.branch_memo.get(&key));

        let pull_request = if matches!(parts.view, ViewKind::Pull) && options.diff_only {
            parts.view_id.clone()
        } else {
            None
        };

        let mut repo = RepoRef {
            owner: parts.owner,
            name: parts.name,
            branch,
            pull_request,
        };

        if repo.branch.is_none() {
            // Still no luck: ask the API for the default branch and memoize.
            let metadata = self.provider.fetch_metadata(&repo.owner, &repo.name).await?;
            let branch = metadata
                .default_branch
                .unwrap_or_else(|| "master".to_string());
            debug!(repo = %key, branch = %branch, "resolved default branch via metadata");
            self.branch_memo.insert(&key, &branch);
            repo.branch = Some(branch);
        }

        Ok(Some(repo))
    }

    fn branch_from_commit_view(&self, view: &ViewKind, view_id: Option<&str>) -> Option<String> {
        if matches!(view, ViewKind::Commit) {
            non_empty(view_id)
        } else {
            None
        }
    }
}

// =============================================================================
// Branch Scrape Helpers
// =============================================================================

/// Branch from the branch-selector affordance.
///
/// Short branch names appear in the selector's label with a generic
/// "Switch branches or tags" title; long names are truncated in the label
/// and spelled out in full in the title. Prefer whichever field carries the
/// real name.
fn branch_from_selector(location: &PageLocation) -> Option<String> {
    let title = location.branch_selector_title.as_deref();
    let label = location.branch_selector_label.as_deref();

    match title {
        Some(t) if t.to_lowercase().starts_with("switch branches") => non_empty(label),
        Some(_) => non_empty(title),
        None => non_empty(label),
    }
}

/// Branch parsed out of a "commits" link href.
fn branch_from_commits_link(location: &PageLocation, owner: &str, name: &str) -> Option<String> {
    let href = location.commits_link_href.as_deref()?;
    let prefix = format!("/{}/{}/commits/", owner, name);
    non_empty(href.strip_prefix(prefix.as_str()))
}

/// Base branch from the pull-request ref selector's title, after the `:`.
fn branch_from_base_ref(location: &PageLocation) -> Option<String> {
    let title = location.base_ref_title.as_deref()?;
    let (_, branch) = title.split_once(':')?;
    non_empty(Some(branch))
}

/// Branch of the previously-selected reference, if it is the same repository.
fn branch_from_previous(previous: Option<&RepoRef>, owner: &str, name: &str) -> Option<String> {
    let previous = previous?;
    if previous.owner == owner && previous.name == name {
        previous.branch.clone()
    } else {
        None
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    match s {
        Some(s) if !s.is_empty() => Some(s.to_string()),
        _ => None,
    }
}

// =============================================================================
// Tests
// =============================================================================
