//! Page location description and resolved repository reference.

use serde::{Deserialize, Serialize};

/// Resolved identity of the repository currently being browsed.
///
/// Immutable for a given navigation event; `branch` may be filled in
/// asynchronously when no local signal carried it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub name: String,
    /// Branch name or commit id, if resolved.
    pub branch: Option<String>,
    /// Pull-request id, set only when browsing a pull-request view.
    pub pull_request: Option<String>,
}

impl RepoRef {
    /// Identity key of the repository, `owner/name`.
    pub fn key(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Whether this reference denotes the same repository as another.
    pub fn same_repo(&self, other: &RepoRef) -> bool {
        self.owner == other.owner && self.name == other.name
    }
}

/// The kind of page a location denotes, derived from its third path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewKind {
    /// Repository root (no third segment).
    Root,
    /// Tree (directory) view.
    Tree,
    /// Blob (file) view.
    Blob,
    /// Single-commit view.
    Commit,
    /// Pull-request view.
    Pull,
    /// Anything else (issues, wiki, ...).
    Other(String),
}

impl ViewKind {
    fn from_segment(segment: Option<&str>) -> Self {
        match segment {
            None => ViewKind::Root,
            Some("tree") => ViewKind::Tree,
            Some("blob") => ViewKind::Blob,
            Some("commit") => ViewKind::Commit,
            Some("pull") => ViewKind::Pull,
            Some(other) => ViewKind::Other(other.to_string()),
        }
    }

    /// Whether this is a code or commit view (including the root).
    pub fn is_code(&self) -> bool {
        matches!(
            self,
            ViewKind::Root | ViewKind::Tree | ViewKind::Blob | ViewKind::Commit
        )
    }
}

/// An opaque description of the page currently being displayed.
///
/// The host glue scrapes these fields from the page; every affordance is
/// optional because no single signal survives all page layouts. Fields the
/// glue cannot observe are simply left `None`.
#[derive(Debug, Clone, Default)]
pub struct PageLocation {
    /// The location pathname, e.g. `/owner/name/blob/main/src/lib.rs`.
    pub pathname: String,
    /// Whether the page is an error ("not found") page.
    pub error_page: bool,
    /// Whether the page is a raw-content page.
    pub raw_page: bool,
    /// Title attribute of the branch-selector affordance.
    pub branch_selector_title: Option<String>,
    /// Visible label of the branch-selector affordance (may be truncated
    /// when the branch name is long).
    pub branch_selector_label: Option<String>,
    /// Href of a "commits" link, when present.
    pub commits_link_href: Option<String>,
    /// Title attribute of the base-ref selector on pull-request pages,
    /// of the form `owner/name:branch`.
    pub base_ref_title: Option<String>,
}

/// The pathname decomposed into its repository-relevant segments.
#[derive(Debug, Clone)]
pub struct LocationParts {
    pub owner: String,
    pub name: String,
    pub view: ViewKind,
    pub view_id: Option<String>,
}

impl PageLocation {
    /// Split the pathname into owner / name / view / view-id.
    ///
    /// Returns `None` when the pathname has fewer than two segments.
    pub fn parts(&self) -> Option<LocationParts> {
        let mut segments = self.pathname.split('/').filter(|s| !s.is_empty());
        let owner = segments.next()?.to_string();
        let name = segments.next()?.to_string();
        let view = ViewKind::from_segment(segments.next());
        let view_id = segments.next().map(|s| s.to_string());
        Some(LocationParts {
            owner,
            name,
            view,
            view_id,
        })
    }

    /// Extract the in-repository path from the pathname.
    ///
    /// Locations look like `/owner/name/kind/ref/path...`; the first four
    /// segments are skipped and the remainder is the tree path. Returns
    /// `None` when the location carries no path.
    pub fn tree_path(&self) -> Option<String> {
        let trimmed = self.pathname.trim_start_matches('/');
        let mut rest = trimmed;
        for _ in 0..4 {
            let (_, tail) = rest.split_once('/')?;
            rest = tail;
        }
        if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(pathname: &str) -> PageLocation {
        PageLocation {
            pathname: pathname.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_parts_repo_root() {
        let parts = location("/rust-lang/rust").parts().unwrap();
        assert_eq!(parts.owner, "rust-lang");
        assert_eq!(parts.name, "rust");
        assert_eq!(parts.view, ViewKind::Root);
        assert!(parts.view_id.is_none());
    }

    #[test]
    fn test_parts_pull_view() {
        let parts = location("/rust-lang/rust/pull/1234").parts().unwrap();
        assert_eq!(parts.view, ViewKind::Pull);
        assert_eq!(parts.view_id.as_deref(), Some("1234"));
    }

    #[test]
    fn test_parts_too_short() {
        assert!(location("/rust-lang").parts().is_none());
        assert!(location("/").parts().is_none());
    }

    #[test]
    fn test_tree_path_extraction() {
        assert_eq!(
            location("/o/n/blob/main/src/lib.rs").tree_path().as_deref(),
            Some("src/lib.rs")
        );
        assert_eq!(
            location("/o/n/tree/main/src").tree_path().as_deref(),
            Some("src")
        );
        assert!(location("/o/n/tree/main").tree_path().is_none());
        assert!(location("/o/n").tree_path().is_none());
    }
}
