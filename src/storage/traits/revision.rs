//! Revision store trait.
//!
//! The selectors never talk to a database directly. They build
//! [`SelectQuery`] values and hand them to a [`RevisionStore`], which owns
//! the connection and knows which table layout it was opened with.
//!
//! # Error Modes and Guarantees
//!
//! | Operation | Atomicity | On failure |
//! |-----------|-----------|------------|
//! | `count` / `fetch_*` | Single read statement | `Error::StoreUnavailable` |
//! | `delete_revisions` | One transaction per call | Rolled back, `Error::StoreUnavailable` |
//!
//! A call to `delete_revisions` either removes the whole batch or nothing.
//! Rows that became an entity's current revision after selection are left
//! in place and not counted as deleted.

use crate::Result;
use crate::models::{CandidateEntity, DeletableRevision};
use crate::storage::{EntityKind, SelectQuery};

/// Read/delete access to a relational revision store.
///
/// # Implementor Notes
///
/// - Methods use `&self` so a store can be shared via `Arc`
/// - Use interior mutability (e.g., `Mutex<Connection>`) for the connection
/// - Never alter the schema of an opened store
pub trait RevisionStore: Send + Sync {
    /// The table layout this store was opened with.
    fn entity_kind(&self) -> EntityKind;

    /// Counts the rows a query would return.
    fn count(&self, query: &SelectQuery) -> Result<u64>;

    /// Fetches candidate rows (`entity_id`, `revision_count`).
    fn fetch_candidates(&self, query: &SelectQuery) -> Result<Vec<CandidateEntity>>;

    /// Fetches deletable rows (`entity_id`, `revision_id`, `timestamp`),
    /// optionally capped at `limit`.
    fn fetch_deletable(
        &self,
        query: &SelectQuery,
        limit: Option<u64>,
    ) -> Result<Vec<DeletableRevision>>;

    /// Deletes a batch of revision rows atomically.
    ///
    /// Returns the number of rows actually removed.
    fn delete_revisions(&self, revisions: &[DeletableRevision]) -> Result<u64>;
}
