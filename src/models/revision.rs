//! Ephemeral selection results.

use serde::Serialize;

/// An entity with a surplus of revisions under its content type's policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CandidateEntity {
    /// Stable entity identifier.
    pub entity_id: i64,
    /// Total number of revisions the entity currently has.
    pub revision_count: u64,
}

/// A revision row that is safe to delete under every active constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeletableRevision {
    /// Owning entity.
    pub entity_id: i64,
    /// Revision identifier.
    pub revision_id: i64,
    /// Revision timestamp (Unix epoch seconds).
    pub timestamp: i64,
}
