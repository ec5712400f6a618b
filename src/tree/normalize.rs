//! Tree normalization: sibling sort and single-child folder collapsing.

use std::cmp::Ordering;

use super::node::{Children, Node, NodeKind};

/// Sort a sibling list and, recursively, every loaded folder under it.
///
/// Folders sort before files; same-kind siblings sort by case-sensitive
/// label comparison; ties keep their order. Folders whose children are not
/// yet loaded are left untouched.
pub fn sort_nodes(nodes: &mut [Node]) {
    nodes.sort_by(compare_siblings);
    for node in nodes.iter_mut() {
        if let Some(children) = node.loaded_children_mut() {
            sort_nodes(children);
        }
    }
}

fn compare_siblings(a: &Node, b: &Node) -> Ordering {
    kind_rank(a.kind)
        .cmp(&kind_rank(b.kind))
        .then_with(|| a.label.cmp(&b.label))
}

fn kind_rank(kind: NodeKind) -> u8 {
    match kind {
        NodeKind::Folder => 0,
        NodeKind::File => 1,
    }
}

/// Collapse chains of single-child folders into one display node.
///
/// A folder whose only child is itself a folder is merged into that child:
/// the surviving node keeps the child's path and id (so lazy fetches and
/// selection still address the real deepest folder) and exposes the
/// `/`-joined labels of the chain. Files are never merged into their
/// parent; a folder holding a single file stays as it is. Applying the
/// pass to its own output changes nothing.
pub fn collapse_nodes(nodes: Vec<Node>) -> Vec<Node> {
    nodes
        .into_iter()
        .map(|mut node| {
            if let Some(children) = node.children.take() {
                let children = match children {
                    Children::Loaded(children) => Children::Loaded(collapse_nodes(children)),
                    not_loaded => not_loaded,
                };
                node.children = Some(children);

                if let Some(children) = node.loaded_children_mut() {
                    if children.len() == 1 && children[0].kind == NodeKind::Folder {
                        let mut only_child = children.remove(0);
                        only_child.label = format!("{}/{}", node.label, only_child.label);
                        return only_child;
                    }
                }
            }
            node
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
