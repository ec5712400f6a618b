//! Flat-to-hierarchical tree assembly.
//!
//! Consumes a flat node list sorted by path (parents before descendants,
//! which byte-wise path order guarantees) and attaches each node under its
//! nearest already-seen ancestor prefix, producing real parent-owns-children
//! structure rooted at the repository root.

use std::collections::{HashMap, HashSet};

use super::node::{Children, Node, NodeKind};

/// Build a hierarchy from a flat, path-sorted node list.
///
/// Every folder in the result has `Loaded` children (possibly empty); a
/// node whose direct parent is not part of the list is attached to its
/// nearest listed ancestor, or to the root when there is none.
pub fn assemble(flat: Vec<Node>) -> Vec<Node> {
    let folder_paths: HashSet<String> = flat
        .iter()
        .filter(|n| n.kind == NodeKind::Folder)
        .map(|n| n.path.clone())
        .collect();

    // Children processed before their parents, so walk the sorted list
    // backwards and buffer each node under its ancestor's path.
    let mut pending: HashMap<String, Vec<Node>> = HashMap::new();
    let mut roots: Vec<Node> = Vec::new();

    for mut node in flat.into_iter().rev() {
        if node.kind == NodeKind::Folder {
            let mut children = pending.remove(&node.path).unwrap_or_default();
            children.reverse(); // restore ascending path order
            node.children = Some(Children::Loaded(children));
        }

        match nearest_ancestor(&node.path, &folder_paths) {
            Some(parent) => pending.entry(parent).or_default().push(node),
            None => roots.push(node),
        }
    }

    roots.reverse();
    roots
}

/// Longest proper prefix of `path` that names a listed folder.
fn nearest_ancestor(path: &str, folders: &HashSet<String>) -> Option<String> {
    let mut candidate = path;
    while let Some((prefix, _)) = candidate.rsplit_once('/') {
        if folders.contains(prefix) {
            return Some(prefix.to_string());
        }
        candidate = prefix;
    }
    None
}

// =============================================================================
// Tests
// =============================================================================
