//! Selection synchronization between the page location and the tree.

pub mod engine;
pub mod front;

pub use engine::{path_prefixes, SelectionSync, SyncError, SyncOutcome, SyncState};
pub use front::{SnapshotFront, TreeFront};
