//! rustbb/crates/storage-adapters/src/lib.rs
//!
//! Adapter implementations of the `domains` ports: a sqlite (sqlx) store for
//! everything persistent, and dashmap-backed in-process adapters for the list
//! cache and session grants.

pub mod memory;
pub mod sqlite;

pub use memory::{MemoryGrants, MemoryListCache};
pub use sqlite::{
    SqliteAttachmentStore, SqliteMemberDirectory, SqlitePointLedger, SqliteStore,
};
