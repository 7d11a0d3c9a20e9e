//! Property-based tests for retention invariants.
//!
//! Uses proptest to verify invariants across random revision histories:
//! - Candidates keep at least the minimum number of revisions
//! - The current revision always survives
//! - A run never deletes more than its quota
//! - `quota_exhausted` is set exactly when the eligible total exceeds the quota

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use proptest::prelude::*;
use revprune::storage::{EntityKind, SqliteRevisionStore};
use revprune::{RetentionPolicy, RevisionDeletionEngine};
use std::sync::Arc;

/// One entity: revision count and which revision is current.
#[derive(Debug, Clone)]
struct History {
    revisions: usize,
    current: prop::sample::Index,
}

fn history() -> impl Strategy<Value = History> {
    (1usize..10, any::<prop::sample::Index>())
        .prop_map(|(revisions, current)| History { revisions, current })
}

/// Seeds histories and returns `(entity_id, revision_count, current_index)`.
fn seed(store: &SqliteRevisionStore, histories: &[History]) -> Vec<(i64, usize, usize)> {
    histories
        .iter()
        .enumerate()
        .map(|(e, h)| {
            let entity = e as i64 + 1;
            for i in 0..h.revisions {
                store
                    .insert_revision(entity, entity * 100 + i as i64, 1_000 + i as i64 * 60)
                    .unwrap();
            }
            let current = h.current.index(h.revisions);
            store
                .insert_entity(entity, "article", Some(entity * 100 + current as i64))
                .unwrap();
            (entity, h.revisions, current)
        })
        .collect()
}

/// Revisions the floor and the current-revision guard leave eligible.
fn expected_deletable(revisions: usize, current: usize, keep: usize) -> u64 {
    if revisions <= keep {
        return 0;
    }
    // Indexes below `revisions - keep` are the oldest, beyond the floor.
    let surplus = revisions - keep;
    let guarded = usize::from(current < surplus);
    (surplus - guarded) as u64
}

proptest! {
    /// Property: a real run respects the floor, the quota, and the current pointer.
    #[test]
    fn prop_run_respects_floor_and_quota(
        histories in prop::collection::vec(history(), 1..6),
        keep in 1usize..5,
        quota in 1u64..40,
    ) {
        let store = Arc::new(SqliteRevisionStore::in_memory(EntityKind::Generic).unwrap());
        let seeded = seed(&store, &histories);
        let expected: u64 = seeded
            .iter()
            .map(|&(_, n, current)| expected_deletable(n, current, keep))
            .sum();

        let policy = RetentionPolicy::new("article")
            .unwrap()
            .with_min_revisions_to_keep(keep as i64);
        let engine = RevisionDeletionEngine::new(Arc::clone(&store));
        let report = engine.run(&[policy], quota, false).unwrap();

        prop_assert!(report.total_deleted <= quota);
        prop_assert_eq!(report.total_deleted, expected.min(quota));
        prop_assert_eq!(report.quota_exhausted, expected > quota);
        prop_assert_eq!(report.total_pending(), expected.saturating_sub(quota));

        for &(entity, n, _) in &seeded {
            let remaining = store.revision_count(entity).unwrap();
            prop_assert!(remaining >= n.min(keep) as u64);
        }
    }

    /// Property: a dry run reports what the real run then deletes.
    #[test]
    fn prop_dry_run_predicts_real_run(
        histories in prop::collection::vec(history(), 1..5),
        keep in 1usize..4,
        quota in 1u64..20,
    ) {
        let store = Arc::new(SqliteRevisionStore::in_memory(EntityKind::Node).unwrap());
        seed(&store, &histories);
        let policy = RetentionPolicy::new("article")
            .unwrap()
            .with_min_revisions_to_keep(keep as i64);
        let engine = RevisionDeletionEngine::new(Arc::clone(&store));

        let dry = engine.run(std::slice::from_ref(&policy), quota, true).unwrap();
        let real = engine.run(&[policy], quota, false).unwrap();

        prop_assert_eq!(dry.total_deleted, real.total_deleted);
        prop_assert_eq!(dry.quota_exhausted, real.quota_exhausted);
    }

    /// Property: out-of-range minimums never replace a valid one.
    #[test]
    fn prop_invalid_minimum_is_ignored(valid in 1i64..1000, invalid in i64::MIN..1) {
        let policy = RetentionPolicy::new("article")
            .unwrap()
            .with_min_revisions_to_keep(valid)
            .with_min_revisions_to_keep(invalid);
        prop_assert_eq!(policy.min_revisions_to_keep(), Some(valid as u32));
    }
}
