//! Rendering-collaborator seam for selection sync.
//!
//! The synchronizer never touches nodes directly; it drives whatever
//! renders the tree through [`TreeFront`]. [`SnapshotFront`] is the
//! built-in implementation over an owned node snapshot, materializing
//! lazy children through a [`TreeSource`] as folders are expanded.

use async_trait::async_trait;
use tracing::debug;

use crate::locate::RepoRef;
use crate::tree::node::{Children, Node};
use crate::tree::normalize::sort_nodes;
use crate::tree::source::{SourceError, TreeSource};

/// The surface the synchronizer drives.
///
/// `expand` may suspend on a lazy fetch; the other operations are
/// cheap structural queries against whatever is currently rendered.
#[async_trait]
pub trait TreeFront: Send {
    /// Whether a node with this path is currently present.
    fn contains(&self, path: &str) -> bool;

    /// Clear every current selection.
    fn deselect_all(&mut self);

    /// Mark the node at this path selected.
    fn select(&mut self, path: &str);

    /// Expand the folder at this path, fetching its children if they
    /// are not yet materialized. Expanding an already-loaded folder
    /// short-circuits without a fetch.
    async fn expand(&mut self, path: &str) -> Result<(), SourceError>;
}

/// A [`TreeFront`] over an owned node snapshot.
pub struct SnapshotFront<'a> {
    repo: &'a RepoRef,
    source: &'a TreeSource,
    roots: &'a mut Vec<Node>,
    selected: Vec<String>,
}

impl<'a> SnapshotFront<'a> {
    pub fn new(repo: &'a RepoRef, source: &'a TreeSource, roots: &'a mut Vec<Node>) -> Self {
        Self {
            repo,
            source,
            roots,
            selected: Vec::new(),
        }
    }

    /// Paths selected so far, in selection order.
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    fn find(&self, path: &str) -> Option<&Node> {
        find_in(self.roots, path)
    }

    fn find_mut(&mut self, path: &str) -> Option<&mut Node> {
        find_in_mut(self.roots, path)
    }
}

/// Locate a node by repository-root-relative path, descending only
/// through loaded children.
fn find_in<'n>(nodes: &'n [Node], path: &str) -> Option<&'n Node> {
    for node in nodes {
        if node.path == path {
            return Some(node);
        }
        if path.starts_with(node.path.as_str()) && path.as_bytes().get(node.path.len()) == Some(&b'/') {
            return node.loaded_children().and_then(|c| find_in(c, path));
        }
    }
    None
}

fn find_in_mut<'n>(nodes: &'n mut [Node], path: &str) -> Option<&'n mut Node> {
    for node in nodes.iter_mut() {
        if node.path == path {
            return Some(node);
        }
        if path.starts_with(node.path.as_str()) && path.as_bytes().get(node.path.len()) == Some(&b'/') {
            return node.loaded_children_mut().and_then(|c| find_in_mut(c, path));
        }
    }
    None
}

#[async_trait]
impl TreeFront for SnapshotFront<'_> {
    fn contains(&self, path: &str) -> bool {
        self.find(path).is_some()
    }

    fn deselect_all(&mut self) {
        self.selected.clear();
    }

    fn select(&mut self, path: &str) {
        self.selected.push(path.to_string());
    }

    async fn expand(&mut self, path: &str) -> Result<(), SourceError> {
        let needs_fetch = matches!(
            self.find(path).and_then(|n| n.children.as_ref()),
            Some(Children::NotLoaded)
        );
        if !needs_fetch {
            return Ok(());
        }

        // Clone the folder handle out so the fetch does not hold a
        // borrow of the snapshot.
        let folder = match self.find(path) {
            Some(node) => node.clone(),
            None => return Ok(()),
        };

        debug!(repo = %self.repo.key(), path, "materializing folder children");
        let mut children = self.source.fetch(self.repo, Some(&folder), false).await?;
        sort_nodes(&mut children);

        if let Some(node) = self.find_mut(path) {
            node.children = Some(Children::Loaded(children));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
