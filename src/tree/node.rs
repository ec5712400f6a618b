//! Tree node model.

use serde::{Deserialize, Serialize};

use crate::provider::TreeEntry;

/// Whether a node is a file or a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    File,
    Folder,
}

/// A folder's child list, which may not have been fetched yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Children {
    /// Children have not been fetched; expanding the folder triggers a
    /// lazy per-folder fetch.
    NotLoaded,
    /// Children are resident.
    Loaded(Vec<Node>),
}

impl Children {
    /// Whether the children are resident.
    pub fn is_loaded(&self) -> bool {
        matches!(self, Children::Loaded(_))
    }
}

/// The kind of change a diff record reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
    Renamed,
    Copied,
    Other,
}

impl ChangeKind {
    /// Parse the API's status string; unknown statuses are preserved as
    /// [`ChangeKind::Other`] rather than rejected.
    pub fn parse(status: &str) -> Self {
        match status {
            "added" => ChangeKind::Added,
            "modified" | "changed" => ChangeKind::Modified,
            "removed" => ChangeKind::Removed,
            "renamed" => ChangeKind::Renamed,
            "copied" => ChangeKind::Copied,
            _ => ChangeKind::Other,
        }
    }
}

/// Aggregated change statistics of a node in pull-request mode.
///
/// For a file these are the file's own numbers; for a synthesized folder
/// they are sums over all changed descendant files, which the remote API
/// never reports itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffStats {
    pub change_kind: ChangeKind,
    pub additions: u64,
    pub deletions: u64,
    pub files_changed: u64,
    /// External link to the changed file, when the API provided one.
    pub source_url: Option<String>,
}

/// One file or folder entry in a tree snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Full path from the repository root; unique within a snapshot.
    pub path: String,
    /// Display label. Normally the last path component; folder collapsing
    /// rewrites it to a `/`-joined chain without touching `path`.
    pub label: String,
    pub kind: NodeKind,
    /// Opaque blob/tree id; present for full-tree nodes, absent for
    /// diff-only synthesized nodes.
    pub id: Option<String>,
    /// API URL of the entry, when known.
    pub url: Option<String>,
    /// Child list; `None` for files.
    pub children: Option<Children>,
    /// Change statistics; present only in pull-request mode.
    pub diff: Option<DiffStats>,
    /// Submodule link parsed from the manifest, when this entry is a
    /// submodule.
    pub submodule_url: Option<String>,
}

impl Node {
    /// Create a file node at the given path.
    pub fn file(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            label: basename(&path).to_string(),
            path,
            kind: NodeKind::File,
            id: None,
            url: None,
            children: None,
            diff: None,
            submodule_url: None,
        }
    }

    /// Create a folder node at the given path with unloaded children.
    pub fn folder(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            label: basename(&path).to_string(),
            path,
            kind: NodeKind::Folder,
            id: None,
            url: None,
            children: Some(Children::NotLoaded),
            diff: None,
            submodule_url: None,
        }
    }

    /// Convert a wire entry into a node.
    ///
    /// `tree` entries become folders with unloaded children; `blob` and
    /// `commit` (submodule) entries become files. Paths from one-level
    /// listings are relative to the listed folder, so the parent path is
    /// prepended when given.
    pub fn from_entry(entry: &TreeEntry, parent_path: Option<&str>) -> Self {
        let path = match parent_path {
            Some(parent) if !parent.is_empty() => format!("{}/{}", parent, entry.path),
            _ => entry.path.clone(),
        };
        let mut node = if entry.entry_type == "tree" {
            Node::folder(path)
        } else {
            Node::file(path)
        };
        node.id = entry.sha.clone();
        node.url = entry.url.clone();
        node
    }

    /// Loaded children, or `None` for files and unloaded folders.
    pub fn loaded_children(&self) -> Option<&[Node]> {
        match &self.children {
            Some(Children::Loaded(children)) => Some(children),
            _ => None,
        }
    }

    /// Mutable loaded children, or `None` for files and unloaded folders.
    pub fn loaded_children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.children {
            Some(Children::Loaded(children)) => Some(children),
            _ => None,
        }
    }
}

/// Last component of a slash-separated path.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
