//! Candidate entity selection.
//!
//! A candidate is an entity of the policy's content type that has strictly
//! more revisions than the retention minimum and, when an inactivity cutoff
//! is set, whose current revision is strictly older than the cutoff.
//!
//! The generated statement looks like this for the generic layout with an
//! inactivity cutoff:
//!
//! ```sql
//! SELECT e.id AS entity_id,
//!        e.current_revision_id AS current_revision_id,
//!        COUNT(r.revision_id) AS revision_count
//! FROM entity e
//! INNER JOIN entity_revision r ON r.entity_id = e.id
//! WHERE e.type = ?1
//!   AND (SELECT cr.timestamp FROM entity_revision cr
//!        WHERE cr.revision_id = e.current_revision_id) < ?2
//! GROUP BY e.id, e.current_revision_id
//! HAVING COUNT(r.revision_id) > ?3
//! ```
//!
//! The inactivity test reads the *current* revision, which is the entity's
//! live pointer and not necessarily its newest row. An entity whose current
//! revision row is missing compares as NULL and is excluded.

use crate::Result;
use crate::models::{CandidateEntity, RetentionPolicy};
use crate::storage::{EntityKind, QueryBuilder, RevisionStore, SelectQuery};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Ordering applied when candidates are listed.
const CANDIDATE_ORDER: &str = "entity_id ASC";

/// Builds the candidate query for a policy.
///
/// Returns `None` for a policy without a minimum; such a policy can never
/// select anything.
#[must_use]
pub fn candidate_query(kind: EntityKind, policy: &RetentionPolicy) -> Option<SelectQuery> {
    let keep = policy.min_revisions_to_keep()?;
    let t = kind.tables();
    let mut builder = QueryBuilder::new();

    let type_p = builder.bind(policy.content_type());
    let mut conditions = vec![format!("e.{} = {type_p}", t.entity_type)];

    if let Some(cutoff) = policy.inactivity_cutoff() {
        let cutoff_p = builder.bind(cutoff);
        conditions.push(format!(
            "(SELECT cr.{ts} FROM {rev} cr WHERE cr.{rid} = e.{cur}) < {cutoff_p}",
            ts = t.revision_timestamp,
            rev = t.revision_table,
            rid = t.revision_id,
            cur = t.current_revision_id,
        ));
    }

    let keep_p = builder.bind(keep);
    let sql = format!(
        "SELECT e.{eid} AS entity_id, e.{cur} AS current_revision_id, \
         COUNT(r.{rid}) AS revision_count \
         FROM {ent} e \
         INNER JOIN {rev} r ON r.{reid} = e.{eid} \
         WHERE {conditions} \
         GROUP BY e.{eid}, e.{cur} \
         HAVING COUNT(r.{rid}) > {keep_p}",
        eid = t.entity_id,
        cur = t.current_revision_id,
        rid = t.revision_id,
        ent = t.entity_table,
        rev = t.revision_table,
        reid = t.revision_entity_id,
        conditions = conditions.join(" AND "),
    );

    Some(builder.build(sql).with_order_by(CANDIDATE_ORDER))
}

/// Selects entities eligible for revision pruning.
pub struct CandidateSelector<S: RevisionStore> {
    store: Arc<S>,
}

impl<S: RevisionStore> CandidateSelector<S> {
    /// Creates a selector over a revision store.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Counts candidate entities for a policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    #[instrument(
        name = "revprune.select.count_candidates",
        skip(self, policy),
        fields(component = "selection", content_type = %policy.content_type())
    )]
    pub fn count_candidates(&self, policy: &RetentionPolicy) -> Result<u64> {
        let Some(query) = candidate_query(self.store.entity_kind(), policy) else {
            debug!("Policy has no minimum, no candidates");
            return Ok(0);
        };
        self.store.count(&query)
    }

    /// Lists candidate entities with their revision counts.
    ///
    /// Ordered by entity id; callers should not rely on the order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    #[instrument(
        name = "revprune.select.list_candidates",
        skip(self, policy),
        fields(component = "selection", content_type = %policy.content_type())
    )]
    pub fn list_candidates(&self, policy: &RetentionPolicy) -> Result<Vec<CandidateEntity>> {
        let Some(query) = candidate_query(self.store.entity_kind(), policy) else {
            debug!("Policy has no minimum, no candidates");
            return Ok(Vec::new());
        };
        self.store.fetch_candidates(&query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{QueryParam, SqliteRevisionStore};

    const DAY: i64 = 86_400;
    const NOW: i64 = 1_750_000_000;

    /// Seeds an entity with revisions `days_ago` old; the newest is current.
    fn seed(store: &SqliteRevisionStore, id: i64, content_type: &str, days_ago: &[i64]) {
        let mut newest = None;
        for (i, age) in days_ago.iter().enumerate() {
            let rid = id * 100 + i64::try_from(i).unwrap();
            let ts = NOW - age * DAY;
            store.insert_revision(id, rid, ts).unwrap();
            if newest.is_none_or(|(_, best)| ts > best) {
                newest = Some((rid, ts));
            }
        }
        store
            .insert_entity(id, content_type, newest.map(|(rid, _)| rid))
            .unwrap();
    }

    fn selector() -> (Arc<SqliteRevisionStore>, CandidateSelector<SqliteRevisionStore>) {
        let store = Arc::new(SqliteRevisionStore::in_memory(EntityKind::Generic).unwrap());
        (Arc::clone(&store), CandidateSelector::new(store))
    }

    fn policy(keep: i64) -> RetentionPolicy {
        RetentionPolicy::new("article")
            .unwrap()
            .with_min_revisions_to_keep(keep)
    }

    #[test]
    fn test_query_binds_in_placeholder_order() {
        let p = policy(3).with_inactivity_cutoff(Some(42));
        let query = candidate_query(EntityKind::Node, &p).unwrap();

        assert_eq!(
            query.params(),
            &[
                QueryParam::Text("article".into()),
                QueryParam::Integer(42),
                QueryParam::Integer(3)
            ]
        );
        assert!(query.sql().contains("FROM node e"));
        assert!(query.sql().contains("HAVING COUNT(r.vid) > ?3"));
    }

    #[test]
    fn test_inactive_policy_has_no_query() {
        let p = RetentionPolicy::new("article").unwrap();
        assert!(candidate_query(EntityKind::Generic, &p).is_none());
    }

    #[test]
    fn test_count_is_strictly_greater_than_minimum() {
        let (store, selector) = selector();
        seed(&store, 1, "article", &[50, 40, 30, 20, 10]);
        seed(&store, 2, "article", &[30, 20, 10]);
        seed(&store, 3, "article", &[10, 5]);

        let candidates = selector.list_candidates(&policy(3)).unwrap();
        assert_eq!(
            candidates,
            vec![CandidateEntity {
                entity_id: 1,
                revision_count: 5
            }]
        );
        assert_eq!(selector.count_candidates(&policy(3)).unwrap(), 1);
    }

    #[test]
    fn test_other_content_types_are_ignored() {
        let (store, selector) = selector();
        seed(&store, 1, "page", &[50, 40, 30, 20, 10]);

        assert_eq!(selector.count_candidates(&policy(1)).unwrap(), 0);
        assert!(selector.list_candidates(&policy(1)).unwrap().is_empty());
    }

    #[test]
    fn test_inactivity_cutoff_excludes_recently_edited() {
        let (store, selector) = selector();
        seed(&store, 1, "article", &[300, 200, 100, 30]);
        seed(&store, 2, "article", &[300, 200, 150, 120]);

        let p = policy(2).with_inactivity_cutoff(Some(NOW - 90 * DAY));
        let ids: Vec<i64> = selector
            .list_candidates(&p)
            .unwrap()
            .into_iter()
            .map(|c| c.entity_id)
            .collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_inactivity_uses_current_revision_pointer() {
        let (store, selector) = selector();
        seed(&store, 1, "article", &[300, 200, 100, 5]);
        // Roll back to an old revision: the newest row is no longer current.
        store.set_current_revision(1, 100).unwrap();

        let p = policy(2).with_inactivity_cutoff(Some(NOW - 90 * DAY));
        assert_eq!(selector.count_candidates(&p).unwrap(), 1);
    }

    #[test]
    fn test_inactive_policy_selects_nothing() {
        let (store, selector) = selector();
        seed(&store, 1, "article", &[5, 4, 3, 2, 1]);

        let p = RetentionPolicy::new("article").unwrap();
        assert_eq!(selector.count_candidates(&p).unwrap(), 0);
        assert!(selector.list_candidates(&p).unwrap().is_empty());
    }

    #[test]
    fn test_current_revision_exactly_at_cutoff_is_still_active() {
        let (store, selector) = selector();
        seed(&store, 1, "article", &[300, 200, 100, 90]);
        seed(&store, 2, "article", &[300, 200, 100, 91]);

        let p = policy(2).with_inactivity_cutoff(Some(NOW - 90 * DAY));
        let ids: Vec<i64> = selector
            .list_candidates(&p)
            .unwrap()
            .into_iter()
            .map(|c| c.entity_id)
            .collect();
        assert_eq!(ids, vec![2]);
    }
}
