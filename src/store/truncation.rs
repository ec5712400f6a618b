//! Truncation cache: repositories known to exceed the listing size limit.
//!
//! The remote tree API silently truncates recursive listings above an
//! undocumented size. Once a repository has been seen truncated, requesting
//! the full listing again would just fail the same way, so the repository
//! key is recorded here and subsequent loads go straight to lazy per-folder
//! fetching. Entries carry a last-seen timestamp; the map is capacity
//! bounded and the stalest entry is evicted when a new key would exceed the
//! bound.

use std::collections::HashMap;
use std::sync::Arc;

use super::clock::Clock;
use super::state_store::{Result, StateStore};

/// Maximum number of repositories remembered as huge.
pub const DEFAULT_HUGE_REPO_CAPACITY: usize = 50;

/// Key of the persisted truncation map in the state store.
const HUGE_REPOS_KEY: &str = "huge-repos";

/// Tracks which repositories are known to return truncated full listings.
///
/// All state lives in the [`StateStore`]; every operation is a whole-map
/// get-mutate-set, so concurrent navigations settle last-writer-wins.
pub struct TruncationCache {
    store: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
    capacity: usize,
}

impl TruncationCache {
    /// Create a truncation cache with the default capacity bound.
    pub fn new(store: Arc<dyn StateStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_capacity(store, clock, DEFAULT_HUGE_REPO_CAPACITY)
    }

    /// Create a truncation cache with an explicit capacity bound.
    pub fn with_capacity(
        store: Arc<dyn StateStore>,
        clock: Arc<dyn Clock>,
        capacity: usize,
    ) -> Self {
        Self {
            store,
            clock,
            capacity,
        }
    }

    /// Whether the repository is marked as huge.
    ///
    /// Visiting a known-huge repository counts as recent activity: a hit
    /// refreshes the entry's timestamp so it is not evicted prematurely.
    pub async fn is_marked_huge(&self, repo_key: &str) -> Result<bool> {
        let mut map = self.load().await?;
        if map.contains_key(repo_key) {
            map.insert(repo_key.to_string(), self.clock.now_millis());
            self.save(&map).await?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Mark a repository as huge, inserting or refreshing its entry.
    ///
    /// If the map would exceed the capacity bound, the entry with the
    /// smallest timestamp is evicted first.
    pub async fn mark_huge(&self, repo_key: &str) -> Result<()> {
        let mut map = self.load().await?;

        if !map.contains_key(repo_key) && map.len() >= self.capacity {
            if let Some(stalest) = map
                .iter()
                .min_by_key(|(_, seen)| **seen)
                .map(|(key, _)| key.clone())
            {
                map.remove(&stalest);
            }
        }

        map.insert(repo_key.to_string(), self.clock.now_millis());
        self.save(&map).await
    }

    /// Refresh the timestamp of an existing entry, if present.
    pub async fn touch(&self, repo_key: &str) -> Result<()> {
        let mut map = self.load().await?;
        if map.contains_key(repo_key) {
            map.insert(repo_key.to_string(), self.clock.now_millis());
            self.save(&map).await?;
        }
        Ok(())
    }

    /// Number of entries currently recorded.
    pub async fn len(&self) -> Result<usize> {
        Ok(self.load().await?.len())
    }

    /// Whether the cache has no entries.
    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.load().await?.is_empty())
    }

    async fn load(&self) -> Result<HashMap<String, i64>> {
        match self.store.get(HUGE_REPOS_KEY).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(HashMap::new()),
        }
    }

    async fn save(&self, map: &HashMap<String, i64>) -> Result<()> {
        self.store
            .set(HUGE_REPOS_KEY, serde_json::to_value(map)?)
            .await
    }
}

// =============================================================================
// Tests
// =============================================================================
