//! Tree model and transforms.
//!
//! A flat listing from the platform API passes through three stages:
//! fetch ([`source`]), hierarchy assembly ([`assemble`]) and display
//! normalization ([`normalize`]). Pull-request listings are first
//! synthesized into the same flat shape by [`diff`].

pub mod assemble;
pub mod diff;
pub mod node;
pub mod normalize;
pub mod source;
pub mod submodules;

pub use assemble::assemble;
pub use diff::diff_to_nodes;
pub use node::{basename, ChangeKind, Children, DiffStats, Node, NodeKind};
pub use normalize::{collapse_nodes, sort_nodes};
pub use source::{SourceError, TreeSource};
pub use submodules::{parse_manifest, parse_manifest_blob, ManifestError};
