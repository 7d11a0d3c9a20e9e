//! Quota-bounded revision deletion.
//!
//! Walks the tracked content types in configuration order, counts what the
//! selectors consider deletable, and removes the oldest eligible revisions
//! until the run's quota is spent.
//!
//! # Example
//!
//! ```rust,ignore
//! use revprune::{RetentionPolicy, RevisionDeletionEngine};
//! use revprune::storage::{EntityKind, SqliteRevisionStore};
//! use std::sync::Arc;
//!
//! let store = Arc::new(SqliteRevisionStore::open("site.db", EntityKind::Generic)?);
//! let engine = RevisionDeletionEngine::new(store);
//! let policies = [RetentionPolicy::new("article")?.with_min_revisions_to_keep(3)];
//!
//! // Dry run to see what would be removed
//! let report = engine.run(&policies, 50, true)?;
//! println!("{}", report.summary());
//! ```

use crate::Result;
use crate::models::{ContentTypeReport, DeletionReport, RetentionPolicy};
use crate::selection::{CandidateSelector, RevisionSelector};
use crate::storage::RevisionStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, instrument, warn};

/// Safely converts Duration to milliseconds as u64, capping at `u64::MAX`.
#[inline]
fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Converts u64 to f64 for metrics, capping at `u32::MAX`.
#[inline]
fn u64_to_f64(value: u64) -> f64 {
    let capped = u32::try_from(value).unwrap_or(u32::MAX);
    f64::from(capped)
}

/// Deletes surplus revisions under a per-run quota.
pub struct RevisionDeletionEngine<S: RevisionStore> {
    store: Arc<S>,
    candidates: CandidateSelector<S>,
    revisions: RevisionSelector<S>,
}

impl<S: RevisionStore> RevisionDeletionEngine<S> {
    /// Creates an engine over a revision store.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            candidates: CandidateSelector::new(Arc::clone(&store)),
            revisions: RevisionSelector::new(Arc::clone(&store)),
            store,
        }
    }

    /// Runs one deletion pass.
    ///
    /// For each policy, in order:
    /// 1. Counts candidate entities and deletable revisions
    /// 2. Fetches the oldest `min(remaining quota, deletable)` revisions
    /// 3. Deletes them in one transaction (unless `dry_run`)
    /// 4. Charges what was deleted against the remaining quota
    ///
    /// Once the quota is spent, later content types are still counted and
    /// their revisions reported as pending.
    ///
    /// # Arguments
    ///
    /// * `policies` - Resolved policies, in configuration order
    /// * `quota` - Maximum revisions to delete in this run
    /// * `dry_run` - If true, report what would be deleted without mutating
    ///
    /// # Errors
    ///
    /// Store failures are recorded on the affected content type's entry and
    /// never abort the run; the `Result` is kept for callers that wrap the
    /// engine in fallible setup.
    #[instrument(
        name = "revprune.prune.run",
        skip(self, policies),
        fields(
            run_id = tracing::field::Empty,
            component = "prune",
            operation = "run",
            entity_kind = %self.store.entity_kind(),
            policies = policies.len(),
            quota = quota,
            dry_run = dry_run
        )
    )]
    pub fn run(
        &self,
        policies: &[RetentionPolicy],
        quota: u64,
        dry_run: bool,
    ) -> Result<DeletionReport> {
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());

        let mut report = DeletionReport {
            run_id,
            quota,
            dry_run,
            ..Default::default()
        };
        let mut remaining = quota;

        for policy in policies {
            let _span = info_span!(
                "revprune.prune.content_type",
                content_type = %policy.content_type(),
                min_revisions_to_keep = policy.min_revisions_to_keep()
            )
            .entered();

            let mut entry = ContentTypeReport::new(policy.content_type());
            if let Err(e) = self.process_policy(policy, remaining, dry_run, &mut entry) {
                warn!(
                    content_type = policy.content_type(),
                    error = %e,
                    "Failed to prune content type, continuing with the next one"
                );
                metrics::counter!(
                    "revision_prune_failures_total",
                    "content_type" => policy.content_type().to_string()
                )
                .increment(1);
                entry.error = Some(e.to_string());
            }
            entry.pending = entry.deletable.saturating_sub(entry.deleted);

            remaining = remaining.saturating_sub(entry.deleted);
            report.total_deleted += entry.deleted;
            report.per_content_type.push(entry);
        }

        report.quota_exhausted = report.total_deletable() > quota;
        report.duration_ms = duration_to_millis(start.elapsed());

        metrics::counter!(
            "revision_prune_runs_total",
            "dry_run" => dry_run.to_string()
        )
        .increment(1);
        if !dry_run {
            metrics::counter!("revision_prune_deleted").increment(report.total_deleted);
        }
        metrics::histogram!("revision_prune_duration_ms").record(u64_to_f64(report.duration_ms));

        info!(
            run_id = %report.run_id,
            total_deleted = report.total_deleted,
            total_pending = report.total_pending(),
            quota_exhausted = report.quota_exhausted,
            duration_ms = report.duration_ms,
            dry_run,
            "Revision prune completed"
        );

        Ok(report)
    }

    /// Counts and deletes for one content type, filling `entry` as it goes.
    ///
    /// Counts recorded before a failure stay on the entry.
    fn process_policy(
        &self,
        policy: &RetentionPolicy,
        remaining: u64,
        dry_run: bool,
        entry: &mut ContentTypeReport,
    ) -> Result<()> {
        entry.candidate_entities = self.candidates.count_candidates(policy)?;
        entry.deletable = self.revisions.count_deletable(policy)?;

        debug!(
            candidates = entry.candidate_entities,
            deletable = entry.deletable,
            remaining_quota = remaining,
            "Counted content type"
        );

        let take = remaining.min(entry.deletable);
        if take == 0 {
            return Ok(());
        }

        if dry_run {
            entry.deleted = take;
            return Ok(());
        }

        let batch = self.revisions.list_deletable_limited(policy, take)?;
        entry.deleted = self.store.delete_revisions(&batch)?;
        Ok(())
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{EntityKind, SqliteRevisionStore};

    const DAY: i64 = 86_400;

    /// Seeds `count` daily revisions for an entity; the newest is current.
    fn seed(store: &SqliteRevisionStore, id: i64, content_type: &str, count: i64, now: i64) {
        for i in 0..count {
            store
                .insert_revision(id, id * 1000 + i, now - (count - i) * DAY)
                .unwrap();
        }
        store
            .insert_entity(id, content_type, Some(id * 1000 + count - 1))
            .unwrap();
    }

    fn policy(content_type: &str, keep: i64) -> RetentionPolicy {
        RetentionPolicy::new(content_type)
            .unwrap()
            .with_min_revisions_to_keep(keep)
    }

    fn engine() -> (Arc<SqliteRevisionStore>, RevisionDeletionEngine<SqliteRevisionStore>) {
        let store = Arc::new(SqliteRevisionStore::in_memory(EntityKind::Generic).unwrap());
        (Arc::clone(&store), RevisionDeletionEngine::new(store))
    }

    #[test]
    fn test_run_deletes_surplus() {
        let (store, engine) = engine();
        let now = crate::current_timestamp();
        seed(&store, 1, "article", 5, now);

        let report = engine.run(&[policy("article", 3)], 50, false).unwrap();

        assert_eq!(report.total_deleted, 2);
        assert!(!report.quota_exhausted);
        assert_eq!(store.revision_count(1).unwrap(), 3);

        let entry = report.get("article").unwrap();
        assert_eq!(entry.candidate_entities, 1);
        assert_eq!(entry.deletable, 2);
        assert_eq!(entry.pending, 0);
        assert!(!report.run_id.is_empty());
    }

    #[test]
    fn test_dry_run_does_not_mutate() {
        let (store, engine) = engine();
        let now = crate::current_timestamp();
        seed(&store, 1, "article", 5, now);

        let report = engine.run(&[policy("article", 3)], 50, true).unwrap();

        assert!(report.dry_run);
        assert_eq!(report.total_deleted, 2);
        assert_eq!(store.revision_count(1).unwrap(), 5);
    }

    #[test]
    fn test_quota_carries_across_content_types() {
        let (store, engine) = engine();
        let now = crate::current_timestamp();
        seed(&store, 1, "article", 6, now);
        seed(&store, 2, "page", 6, now);

        let policies = [policy("article", 2), policy("page", 2)];
        let report = engine.run(&policies, 5, false).unwrap();

        assert_eq!(report.total_deleted, 5);
        assert!(report.quota_exhausted);
        assert_eq!(report.get("article").unwrap().deleted, 4);
        let page = report.get("page").unwrap();
        assert_eq!(page.deleted, 1);
        assert_eq!(page.pending, 3);
        assert_eq!(store.revision_count(2).unwrap(), 5);
    }

    #[test]
    fn test_spent_quota_still_counts() {
        let (store, engine) = engine();
        let now = crate::current_timestamp();
        seed(&store, 1, "article", 4, now);
        seed(&store, 2, "page", 4, now);

        let policies = [policy("article", 1), policy("page", 1)];
        let report = engine.run(&policies, 3, false).unwrap();

        let page = report.get("page").unwrap();
        assert_eq!(page.deleted, 0);
        assert_eq!(page.deletable, 3);
        assert_eq!(page.pending, 3);
        assert_eq!(report.total_pending(), 3);
    }

    #[test]
    fn test_entries_follow_policy_order() {
        let (_store, engine) = engine();
        let policies = [policy("page", 1), policy("article", 1)];

        let report = engine.run(&policies, 10, true).unwrap();
        let order: Vec<&str> = report
            .per_content_type
            .iter()
            .map(|e| e.content_type.as_str())
            .collect();
        assert_eq!(order, vec!["page", "article"]);
        assert_eq!(
            report.summary(),
            format!(
                "No revisions to delete (2 content types checked in {}ms)",
                report.duration_ms
            )
        );
    }
}
