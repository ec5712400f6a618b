//! Per-session default-branch memo.
//!
//! Resolving a branch can require a metadata request to the API; the answer
//! is keyed by `owner/name` and memoized for the rest of the session so
//! repeated navigations inside one repository do not re-fetch it.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

/// Default number of repositories whose default branch is remembered.
const DEFAULT_MEMO_CAPACITY: usize = 100;

/// A bounded in-memory memo of `owner/name -> default branch`.
pub struct DefaultBranchMemo {
    entries: Mutex<LruCache<String, String>>,
}

impl DefaultBranchMemo {
    /// Create a memo with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MEMO_CAPACITY)
    }

    /// Create a memo with an explicit capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Look up the memoized default branch for a repository key.
    pub fn get(&self, repo_key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap();
        entries.get(repo_key).cloned()
    }

    /// Record the default branch for a repository key.
    pub fn insert(&self, repo_key: &str, branch: &str) {
        let mut entries = self.entries.lock().unwrap();
        entries.put(repo_key.to_string(), branch.to_string());
    }
}

impl Default for DefaultBranchMemo {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memo_roundtrip() {
        let memo = DefaultBranchMemo::new();
        assert!(memo.get("owner/repo").is_none());

        memo.insert("owner/repo", "main");
        assert_eq!(memo.get("owner/repo").as_deref(), Some("main"));
    }

    #[test]
    fn test_memo_bounded() {
        let memo = DefaultBranchMemo::with_capacity(2);
        memo.insert("a/a", "main");
        memo.insert("b/b", "master");
        memo.insert("c/c", "trunk");

        // "a/a" was least recently used and is gone.
        assert!(memo.get("a/a").is_none());
        assert_eq!(memo.get("b/b").as_deref(), Some("master"));
        assert_eq!(memo.get("c/c").as_deref(), Some("trunk"));
    }
}
