//! rustbb/crates/domains/src/error.rs
//!
//! Centralized error handling for the rustbb ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum BbsError {
    /// Ownership/level/grant checks failed. User-facing.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Anonymous content requires a prior password challenge.
    /// `challenge` is the path callers should redirect to.
    #[error("password challenge required: {challenge}")]
    ChallengeRequired { challenge: String },

    /// User-facing conflict (replies exist, comment threshold exceeded).
    /// Never retried.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Resource not found (board, post, comment, recency entry).
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Operating on a comment as if a post, or vice versa.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// Commit/transaction failure. The whole operation must be treated
    /// as rolled back; ledger and attachment-store failures surface here too.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl BbsError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }
}

/// A specialized Result type for rustbb logic.
pub type BbsResult<T> = std::result::Result<T, BbsError>;
