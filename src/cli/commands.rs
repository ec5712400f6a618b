//! Command implementations and tree rendering.

use std::sync::Arc;

use crate::app::{Snapshot, TreeService};
use crate::config::Config;
use crate::locate::{LocatorOptions, Locator, PageLocation, RepoRef};
use crate::provider::TreeProvider;
use crate::store::DefaultBranchMemo;
use crate::sync::SyncOutcome;
use crate::tree::node::{Children, Node, NodeKind};

use super::{CliError, Result};

// =============================================================================
// Argument Parsing
// =============================================================================

/// Split an `owner/name` argument.
pub fn parse_repo(arg: &str) -> Result<(String, String)> {
    match arg.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner.to_string(), name.to_string()))
        }
        _ => Err(CliError::InvalidRepo(arg.to_string())),
    }
}

/// Resolve the branch to list: the explicit argument, or the
/// repository's default branch from metadata.
pub async fn resolve_branch(
    provider: &dyn TreeProvider,
    owner: &str,
    name: &str,
    branch: Option<String>,
) -> Result<String> {
    if let Some(branch) = branch {
        return Ok(branch);
    }
    let metadata = provider.fetch_metadata(owner, name).await?;
    Ok(metadata
        .default_branch
        .unwrap_or_else(|| "master".to_string()))
}

// =============================================================================
// Commands
// =============================================================================

/// `tree` - print a repository's file tree.
pub async fn run_tree(
    service: &TreeService,
    provider: Arc<dyn TreeProvider>,
    repo_arg: &str,
    branch: Option<String>,
    select: Option<String>,
) -> Result<()> {
    let (owner, name) = parse_repo(repo_arg)?;
    let branch = resolve_branch(provider.as_ref(), &owner, &name, branch).await?;
    let repo = RepoRef {
        owner,
        name,
        branch: Some(branch),
        pull_request: None,
    };

    let mut snapshot = service.show_tree(&repo).await?;

    if let Some(path) = select {
        let report = service.sync_selection(&mut snapshot, &path).await?;
        match report.outcome {
            SyncOutcome::Done => println!("selected: {}", path),
            SyncOutcome::Stalled { .. } => match report.selected.last() {
                Some(deepest) => println!("selected: {} (requested {})", deepest, path),
                None => println!("selected: none (requested {})", path),
            },
        }
    }

    print!("{}", render_snapshot(&snapshot));
    Ok(())
}

/// `diff` - print the changed-file tree of a pull request.
pub async fn run_diff(service: &TreeService, repo_arg: &str, pull: &str) -> Result<()> {
    let (owner, name) = parse_repo(repo_arg)?;
    let repo = RepoRef {
        owner,
        name,
        branch: None,
        pull_request: Some(pull.to_string()),
    };

    let snapshot = service.show_tree(&repo).await?;
    print!("{}", render_snapshot(&snapshot));
    Ok(())
}

/// `locate` - resolve a page pathname to a repository reference.
pub async fn run_locate(
    provider: Arc<dyn TreeProvider>,
    config: &Config,
    pathname: &str,
) -> Result<()> {
    let memo = DefaultBranchMemo::new();
    let locator = Locator::new(provider.as_ref(), &memo);
    let location = PageLocation {
        pathname: pathname.to_string(),
        ..Default::default()
    };
    let options = LocatorOptions {
        show_in: config.tree.show_in,
        diff_only: config.tree.diff_only,
    };

    match locator.resolve(&location, None, options).await? {
        Some(repo) => {
            let branch = repo.branch.as_deref().unwrap_or("?");
            match &repo.pull_request {
                Some(pull) => println!("{}@{} pull #{}", repo.key(), branch, pull),
                None => println!("{}@{}", repo.key(), branch),
            }
        }
        None => println!("not a repository view"),
    }
    Ok(())
}

// =============================================================================
// Rendering
// =============================================================================

/// Render a snapshot as an indented text tree.
pub fn render_snapshot(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    render_nodes(&snapshot.roots, 0, &mut out);
    out
}

fn render_nodes(nodes: &[Node], depth: usize, out: &mut String) {
    for node in nodes {
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(&node.label);
        if node.kind == NodeKind::Folder {
            out.push('/');
        }
        if let Some(stats) = &node.diff {
            if node.kind == NodeKind::Folder {
                out.push_str(&format!(
                    " (+{} -{}, {} files)",
                    stats.additions, stats.deletions, stats.files_changed
                ));
            } else {
                out.push_str(&format!(" (+{} -{})", stats.additions, stats.deletions));
            }
        }
        if let Some(url) = &node.submodule_url {
            out.push_str(&format!(" @ {}", url));
        }
        out.push('\n');

        match node.children.as_ref() {
            Some(Children::Loaded(children)) => render_nodes(children, depth + 1, out),
            Some(Children::NotLoaded) | None => {}
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::node::{ChangeKind, DiffStats};

    #[test]
    fn test_parse_repo() {
        assert_eq!(
            parse_repo("rust-lang/rust").unwrap(),
            ("rust-lang".to_string(), "rust".to_string())
        );
        assert!(parse_repo("rust-lang").is_err());
        assert!(parse_repo("a/b/c").is_err());
        assert!(parse_repo("/rust").is_err());
    }

    #[test]
    fn test_render_nodes() {
        let mut folder = Node::folder("src");
        folder.children = Some(Children::Loaded(vec![Node::file("src/lib.rs")]));
        let mut lazy = Node::folder("vendor");
        lazy.submodule_url = Some("https://example.invalid/dep.git".to_string());

        let mut out = String::new();
        render_nodes(&[folder, lazy, Node::file("README.md")], 0, &mut out);
        assert_eq!(
            out,
            "src/\n  lib.rs\nvendor/ @ https://example.invalid/dep.git\nREADME.md\n"
        );
    }

    #[test]
    fn test_render_diff_annotations() {
        let mut folder = Node::folder("src");
        folder.children = Some(Children::Loaded(vec![]));
        folder.diff = Some(DiffStats {
            change_kind: ChangeKind::Modified,
            additions: 3,
            deletions: 6,
            files_changed: 2,
            source_url: None,
        });
        let mut file = Node::file("src/x.js");
        file.diff = Some(DiffStats {
            change_kind: ChangeKind::Modified,
            additions: 3,
            deletions: 1,
            files_changed: 1,
            source_url: None,
        });

        let mut out = String::new();
        render_nodes(&[folder, file], 0, &mut out);
        assert_eq!(out, "src/ (+3 -6, 2 files)\nx.js (+3 -1)\n");
    }
}
