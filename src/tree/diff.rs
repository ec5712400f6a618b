//! Diff-to-tree transformation.
//!
//! The pull-request API reports only flat changed-file records; it never
//! reports folders. The sidebar still needs folder rows so a reviewer can
//! navigate by directory and see aggregated change magnitude, so every
//! ancestor folder of every changed file is synthesized here, carrying
//! sums over its changed descendants.

use std::collections::HashMap;

use crate::provider::PullFile;

use super::node::{ChangeKind, Children, DiffStats, Node, NodeKind};

/// Convert a flat changed-file listing into a flat node list covering
/// every changed file and every ancestor folder, sorted by path.
///
/// Each changed file contributes exactly once to each of its ancestor
/// folders' statistics, however many other changed files share that
/// ancestor. The output is sorted by plain byte-wise path comparison so a
/// folder always precedes its descendants when the list is consumed as a
/// flat-to-hierarchical build order.
pub fn diff_to_nodes(files: &[PullFile]) -> Vec<Node> {
    let mut records: HashMap<String, Node> = HashMap::new();

    for file in files {
        // The file's own entry; a later record for the same path wins.
        let mut node = Node::file(file.filename.clone());
        node.id = file.sha.clone();
        node.url = file.blob_url.clone();
        node.diff = Some(DiffStats {
            change_kind: ChangeKind::parse(&file.status),
            additions: file.additions,
            deletions: file.deletions,
            files_changed: 1,
            source_url: file.blob_url.clone(),
        });
        records.insert(file.filename.clone(), node);

        // Fold the file's numbers into every ancestor folder.
        for ancestor in ancestor_paths(&file.filename) {
            match records.get_mut(&ancestor) {
                Some(existing) => {
                    let stats = existing
                        .diff
                        .as_mut()
                        .expect("synthesized folders always carry stats");
                    stats.additions += file.additions;
                    stats.deletions += file.deletions;
                    stats.files_changed += 1;
                }
                None => {
                    let mut folder = Node::folder(ancestor.clone());
                    folder.children = Some(Children::Loaded(Vec::new()));
                    folder.diff = Some(DiffStats {
                        change_kind: ChangeKind::Modified,
                        additions: file.additions,
                        deletions: file.deletions,
                        files_changed: 1,
                        source_url: None,
                    });
                    records.insert(ancestor, folder);
                }
            }
        }
    }

    let mut nodes: Vec<Node> = records.into_values().collect();
    nodes.sort_by(|a, b| a.path.cmp(&b.path));
    nodes
}

/// Every non-empty proper prefix of a path, shallowest first.
///
/// `a/b/c.rs` yields `a` and `a/b`. Empty components (a leading slash, a
/// doubled separator) produce no prefix.
fn ancestor_paths(path: &str) -> Vec<String> {
    let mut prefixes = Vec::new();
    let mut end = 0;
    for component in path.split('/') {
        if end + component.len() >= path.len() {
            break;
        }
        end += component.len();
        if !component.is_empty() {
            prefixes.push(path[..end].to_string());
        }
        end += 1; // the separator
    }
    prefixes
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pull_file(filename: &str, additions: u64, deletions: u64) -> PullFile {
        PullFile {
            filename: filename.to_string(),
            status: "modified".to_string(),
            additions,
            deletions,
            sha: Some(format!("sha-{}", filename)),
            previous_filename: None,
            blob_url: Some(format!("https://example.invalid/{}", filename)),
        }
    }

    fn stats<'a>(nodes: &'a [Node], path: &str) -> &'a DiffStats {
        nodes
            .iter()
            .find(|n| n.path == path)
            .unwrap_or_else(|| panic!("missing node {}", path))
            .diff
            .as_ref()
            .unwrap()
    }

    #[test]
    fn test_ancestor_paths() {
        assert_eq!(ancestor_paths("a/b/c.rs"), vec!["a", "a/b"]);
        assert!(ancestor_paths("top.rs").is_empty());
    }

    #[test]
    fn test_ancestor_paths_skip_empty_components() {
        assert_eq!(ancestor_paths("/a/b.rs"), vec!["/a"]);
        assert_eq!(ancestor_paths("a//b.rs"), vec!["a"]);
        assert!(ancestor_paths("/top.rs").is_empty());
    }

    #[test]
    fn test_end_to_end_scenario() {
        let nodes = diff_to_nodes(&[pull_file("src/x.js", 3, 1), pull_file("src/y.js", 0, 5)]);

        let paths: Vec<&str> = nodes.iter().map(|n| n.path.as_str()).collect();
        assert_eq!(paths, vec!["src", "src/x.js", "src/y.js"]);

        let src = stats(&nodes, "src");
        assert_eq!(src.additions, 3);
        assert_eq!(src.deletions, 6);
        assert_eq!(src.files_changed, 2);

        let x = stats(&nodes, "src/x.js");
        assert_eq!((x.additions, x.deletions, x.files_changed), (3, 1, 1));
        let y = stats(&nodes, "src/y.js");
        assert_eq!((y.additions, y.deletions, y.files_changed), (0, 5, 1));
    }

    #[test]
    fn test_deep_shared_ancestors() {
        let nodes = diff_to_nodes(&[
            pull_file("a/b/c/one.rs", 1, 0),
            pull_file("a/b/two.rs", 2, 0),
            pull_file("a/b/c/three.rs", 4, 8),
        ]);

        // Each changed file counts once at every ancestor level.
        let a = stats(&nodes, "a");
        assert_eq!((a.additions, a.deletions, a.files_changed), (7, 8, 3));
        let ab = stats(&nodes, "a/b");
        assert_eq!((ab.additions, ab.deletions, ab.files_changed), (7, 8, 3));
        let abc = stats(&nodes, "a/b/c");
        assert_eq!((abc.additions, abc.deletions, abc.files_changed), (5, 8, 2));
    }

    #[test]
    fn test_folder_files_changed_counts_descendant_files() {
        let nodes = diff_to_nodes(&[
            pull_file("src/a.rs", 1, 1),
            pull_file("src/sub/b.rs", 1, 1),
            pull_file("src/sub/deep/c.rs", 1, 1),
            pull_file("other.rs", 1, 1),
        ]);

        assert_eq!(stats(&nodes, "src").files_changed, 3);
        assert_eq!(stats(&nodes, "src/sub").files_changed, 2);
        assert_eq!(stats(&nodes, "src/sub/deep").files_changed, 1);
    }

    #[test]
    fn test_sorted_parents_before_descendants() {
        let nodes = diff_to_nodes(&[
            pull_file("z/inner/file.rs", 1, 0),
            pull_file("a.rs", 1, 0),
            pull_file("z/other.rs", 1, 0),
        ]);

        let paths: Vec<&str> = nodes.iter().map(|n| n.path.as_str()).collect();
        assert_eq!(paths, vec!["a.rs", "z", "z/inner", "z/inner/file.rs", "z/other.rs"]);

        // Lexicographic-prefix property: every node's parent precedes it.
        for (i, node) in nodes.iter().enumerate() {
            if let Some((parent, _)) = node.path.rsplit_once('/') {
                let parent_index = nodes.iter().position(|n| n.path == parent).unwrap();
                assert!(parent_index < i);
            }
        }
    }

    #[test]
    fn test_file_nodes_carry_source_metadata() {
        let nodes = diff_to_nodes(&[pull_file("src/x.js", 1, 0)]);
        let x = nodes.iter().find(|n| n.path == "src/x.js").unwrap();
        assert_eq!(x.kind, NodeKind::File);
        assert_eq!(x.id.as_deref(), Some("sha-src/x.js"));
        assert!(x.diff.as_ref().unwrap().source_url.is_some());

        let src = nodes.iter().find(|n| n.path == "src").unwrap();
        assert_eq!(src.kind, NodeKind::Folder);
        assert!(src.id.is_none());
    }

    #[test]
    fn test_empty_input() {
        assert!(diff_to_nodes(&[]).is_empty());
    }
}
