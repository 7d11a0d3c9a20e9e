//! Deletion run report.

use serde::Serialize;

/// Per-content-type outcome of a deletion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentTypeReport {
    /// The content type.
    pub content_type: String,
    /// Entities with a surplus of revisions.
    pub candidate_entities: u64,
    /// Revisions eligible for deletion at selection time.
    pub deletable: u64,
    /// Revisions that were (or, in a dry run, would be) deleted.
    pub deleted: u64,
    /// Eligible revisions left for a later run because of the quota.
    pub pending: u64,
    /// Failure recorded for this content type's batch.
    pub error: Option<String>,
}

impl ContentTypeReport {
    /// Creates an empty entry for a content type.
    #[must_use]
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            ..Default::default()
        }
    }

    /// Returns `true` if this content type's batch failed.
    #[must_use]
    pub const fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Result of one [`RevisionDeletionEngine::run`](crate::RevisionDeletionEngine::run).
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeletionReport {
    /// Correlation id for log lines emitted by this run.
    pub run_id: String,
    /// Entries in policy order.
    pub per_content_type: Vec<ContentTypeReport>,
    /// Revisions deleted across all content types.
    pub total_deleted: u64,
    /// The quota the run was given.
    pub quota: u64,
    /// Whether the eligible total exceeded the quota.
    pub quota_exhausted: bool,
    /// Whether this was a dry run (no mutation issued).
    pub dry_run: bool,
    /// Duration of the run in milliseconds.
    pub duration_ms: u64,
}

impl DeletionReport {
    /// Looks up the entry for a content type.
    #[must_use]
    pub fn get(&self, content_type: &str) -> Option<&ContentTypeReport> {
        self.per_content_type
            .iter()
            .find(|entry| entry.content_type == content_type)
    }

    /// Sum of deletable revisions over all content types that were counted.
    #[must_use]
    pub fn total_deletable(&self) -> u64 {
        self.per_content_type.iter().map(|e| e.deletable).sum()
    }

    /// Sum of revisions left for later runs.
    #[must_use]
    pub fn total_pending(&self) -> u64 {
        self.per_content_type.iter().map(|e| e.pending).sum()
    }

    /// Returns `true` if any content type's batch failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.per_content_type.iter().any(ContentTypeReport::failed)
    }

    /// Returns a human-readable summary of the run.
    #[must_use]
    pub fn summary(&self) -> String {
        let action = if self.dry_run {
            "would delete"
        } else {
            "deleted"
        };

        if self.total_deleted == 0 && !self.has_failures() {
            return format!(
                "No revisions to delete ({} content types checked in {}ms)",
                self.per_content_type.len(),
                self.duration_ms
            );
        }

        let breakdown: Vec<String> = self
            .per_content_type
            .iter()
            .map(|e| match &e.error {
                Some(err) => format!("{}: failed ({err})", e.content_type),
                None => format!("{}: {} ({} pending)", e.content_type, e.deleted, e.pending),
            })
            .collect();

        let mut summary = format!(
            "{} {} revisions ({}) in {}ms",
            action,
            self.total_deleted,
            breakdown.join(", "),
            self.duration_ms
        );
        if self.quota_exhausted {
            summary.push_str(&format!(
                " - quota of {} exhausted, {} pending",
                self.quota,
                self.total_pending()
            ));
        }
        summary
    }
}
