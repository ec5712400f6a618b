//! Persisted and session-scoped state shared across navigations.

mod branch_memo;
mod clock;
mod state_store;
mod truncation;

pub use branch_memo::DefaultBranchMemo;
pub use clock::{Clock, ManualClock, SystemClock};
pub use state_store::{
    JsonFileStateStore, MemoryStateStore, Result, StateStore, StateStoreError,
};
pub use truncation::{TruncationCache, DEFAULT_HUGE_REPO_CAPACITY};
