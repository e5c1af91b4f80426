//! rustbb/crates/storage-adapters/src/memory.rs
//!
//! In-process adapters for the per-instance concerns: the list cache and the
//! session grant set. Both are dashmap-backed and safe to share across tasks.

use dashmap::{DashMap, DashSet};
use domains::{BbsResult, GrantPurpose, ListCache, SessionGrants};

/// Key-prefixed cache for rendered list fragments. Unbounded; entries live
/// until a deletion invalidates their prefix.
#[derive(Default)]
pub struct MemoryListCache {
    entries: DashMap<String, String>,
}

impl MemoryListCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ListCache for MemoryListCache {
    fn put(&self, key: &str, value: String) {
        self.entries.insert(key.to_owned(), value);
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn delete_prefix(&self, prefix: &str) -> BbsResult<usize> {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        Ok(before - self.entries.len())
    }
}

/// Session-scoped capabilities established by a prior password challenge.
/// One instance per session; the api layer owns the session-to-instance map.
#[derive(Default)]
pub struct MemoryGrants {
    granted: DashSet<(GrantPurpose, String, i64)>,
}

impl MemoryGrants {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionGrants for MemoryGrants {
    fn has(&self, purpose: GrantPurpose, board: &str, write_id: i64) -> bool {
        self.granted
            .contains(&(purpose, board.to_owned(), write_id))
    }

    fn grant(&self, purpose: GrantPurpose, board: &str, write_id: i64) {
        self.granted.insert((purpose, board.to_owned(), write_id));
    }

    fn revoke(&self, purpose: GrantPurpose, board: &str, write_id: i64) {
        self.granted.remove(&(purpose, board.to_owned(), write_id));
    }
}
