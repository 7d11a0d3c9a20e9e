//! # Revprune
//!
//! Policy-driven pruning of content revision history.
//!
//! Each tracked content type carries a [`RetentionPolicy`]: a minimum number
//! of most-recent revisions to keep per entity, an optional minimum age below
//! which revisions are never deleted, and an optional inactivity cutoff that
//! excludes entities still being edited. The selectors translate a policy into
//! set queries against a relational revision store, and the
//! [`RevisionDeletionEngine`] deletes the selected rows under a per-run quota.
//!
//! ## Example
//!
//! ```rust,ignore
//! use revprune::{RetentionPolicy, RevisionDeletionEngine};
//! use revprune::storage::{EntityKind, SqliteRevisionStore};
//! use std::sync::Arc;
//!
//! let store = Arc::new(SqliteRevisionStore::open("site.db", EntityKind::Node)?);
//! let policy = RetentionPolicy::new("article")?.with_min_revisions_to_keep(3);
//!
//! let engine = RevisionDeletionEngine::new(store);
//! let report = engine.run(&[policy], 50, true)?;
//! println!("{}", report.summary());
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod config;
pub mod gc;
pub mod models;
pub mod observability;
pub mod selection;
pub mod storage;

pub use config::{CronFrequency, PruneConfig, TimeBound, TimeUnit};
pub use gc::RevisionDeletionEngine;
pub use models::{
    CandidateEntity, ContentTypeReport, DeletableRevision, DeletionReport, RetentionPolicy,
};
pub use selection::{CandidateSelector, RevisionSelector};
pub use storage::{EntityKind, RevisionStore, SelectQuery, SqliteRevisionStore};

/// Error type for revprune operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidPolicy` | Empty content type, minimum below 1, duplicate tracked type |
/// | `StoreUnavailable` | The revision store cannot be opened, queried, or written |
/// | `InvalidInput` | Malformed CLI or configuration values |
/// | `OperationFailed` | Config file I/O, logging initialization |
#[derive(Debug, ThisError)]
pub enum Error {
    /// A retention policy is malformed.
    ///
    /// Recovered locally: the offending policy is skipped and the remaining
    /// content types are processed.
    #[error("invalid policy for '{content_type}': {reason}")]
    InvalidPolicy {
        /// The content type the policy belongs to.
        content_type: String,
        /// Why the policy was rejected.
        reason: String,
    },

    /// The revision store failed.
    ///
    /// Raised when:
    /// - The `SQLite` database cannot be opened
    /// - A count, select, or delete statement fails
    /// - A deletion transaction cannot be committed
    #[error("store unavailable during '{operation}': {cause}")]
    StoreUnavailable {
        /// The store operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - The configuration file cannot be read, parsed, or written
    /// - Logging has already been initialized
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Wraps a store-level failure for the named operation.
    pub fn store(operation: &str, cause: impl std::fmt::Display) -> Self {
        Self::StoreUnavailable {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for revprune operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in seconds.
///
/// Falls back to 0 if the system clock is before the Unix epoch.
///
/// # Examples
///
/// ```rust
/// use revprune::current_timestamp;
///
/// assert!(current_timestamp() > 0);
/// ```
#[must_use]
pub fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
