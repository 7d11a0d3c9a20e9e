//! Deletable revision selection.
//!
//! For each candidate entity, revisions are ranked newest first. A revision
//! is deletable when its rank exceeds the retention minimum, it is older
//! than the minimum retain age (when set), and it is not the entity's
//! current revision. The candidate query is embedded as a derived relation
//! so both selections are always evaluated against the same rule.

use super::candidate::candidate_query;
use crate::Result;
use crate::models::{DeletableRevision, RetentionPolicy};
use crate::storage::{EntityKind, QueryBuilder, RevisionStore, SelectQuery};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Oldest revisions first, grouped by entity.
const DELETABLE_ORDER: &str = "entity_id ASC, revision_timestamp ASC, revision_id ASC";

/// Builds the deletable-revision query for a policy.
///
/// Returns `None` for a policy without a minimum.
#[must_use]
pub fn deletable_query(kind: EntityKind, policy: &RetentionPolicy) -> Option<SelectQuery> {
    let keep = policy.min_revisions_to_keep()?;
    let candidates = candidate_query(kind, policy)?;
    let t = kind.tables();

    let (mut builder, trimmed) = QueryBuilder::wrapping(candidates);
    let keep_p = builder.bind(keep);
    let mut conditions = vec![
        format!("ranked.recency_rank > {keep_p}"),
        "(ranked.current_revision_id IS NULL OR ranked.revision_id <> ranked.current_revision_id)"
            .to_string(),
    ];
    if let Some(age) = policy.min_retain_age() {
        let age_p = builder.bind(age);
        conditions.push(format!("ranked.revision_timestamp < {age_p}"));
    }

    let sql = format!(
        "SELECT ranked.entity_id AS entity_id, ranked.revision_id AS revision_id, \
         ranked.revision_timestamp AS revision_timestamp \
         FROM (\
         SELECT rv.{reid} AS entity_id, rv.{rid} AS revision_id, \
         rv.{ts} AS revision_timestamp, \
         trimmed.current_revision_id AS current_revision_id, \
         ROW_NUMBER() OVER (PARTITION BY rv.{reid} ORDER BY rv.{ts} DESC, rv.{rid} DESC) \
         AS recency_rank \
         FROM {rev} rv \
         INNER JOIN ({trimmed}) trimmed ON trimmed.entity_id = rv.{reid}\
         ) ranked \
         WHERE {conditions}",
        reid = t.revision_entity_id,
        rid = t.revision_id,
        ts = t.revision_timestamp,
        rev = t.revision_table,
        conditions = conditions.join(" AND "),
    );

    Some(builder.build(sql).with_order_by(DELETABLE_ORDER))
}

/// Selects revisions that may be deleted under a policy.
pub struct RevisionSelector<S: RevisionStore> {
    store: Arc<S>,
}

impl<S: RevisionStore> RevisionSelector<S> {
    /// Creates a selector over a revision store.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Counts deletable revisions for a policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    #[instrument(
        name = "revprune.select.count_deletable",
        skip(self, policy),
        fields(component = "selection", content_type = %policy.content_type())
    )]
    pub fn count_deletable(&self, policy: &RetentionPolicy) -> Result<u64> {
        let Some(query) = deletable_query(self.store.entity_kind(), policy) else {
            debug!("Policy has no minimum, nothing deletable");
            return Ok(0);
        };
        self.store.count(&query)
    }

    /// Lists every deletable revision for a policy, oldest first per entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn list_deletable(&self, policy: &RetentionPolicy) -> Result<Vec<DeletableRevision>> {
        self.fetch(policy, None)
    }

    /// Lists at most `limit` deletable revisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn list_deletable_limited(
        &self,
        policy: &RetentionPolicy,
        limit: u64,
    ) -> Result<Vec<DeletableRevision>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.fetch(policy, Some(limit))
    }

    #[instrument(
        name = "revprune.select.list_deletable",
        skip(self, policy),
        fields(component = "selection", content_type = %policy.content_type())
    )]
    fn fetch(
        &self,
        policy: &RetentionPolicy,
        limit: Option<u64>,
    ) -> Result<Vec<DeletableRevision>> {
        let Some(query) = deletable_query(self.store.entity_kind(), policy) else {
            debug!("Policy has no minimum, nothing deletable");
            return Ok(Vec::new());
        };
        self.store.fetch_deletable(&query, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{QueryParam, SqliteRevisionStore};
    use test_case::test_case;

    const DAY: i64 = 86_400;
    const NOW: i64 = 1_750_000_000;

    /// Entity 1 with five revisions aged 50..10 days; the newest is current.
    fn store_with_five(kind: EntityKind) -> Arc<SqliteRevisionStore> {
        let store = SqliteRevisionStore::in_memory(kind).unwrap();
        for (rid, age) in [(101, 50), (102, 40), (103, 30), (104, 20), (105, 10)] {
            store.insert_revision(1, rid, NOW - age * DAY).unwrap();
        }
        store.insert_entity(1, "article", Some(105)).unwrap();
        Arc::new(store)
    }

    fn policy(keep: i64) -> RetentionPolicy {
        RetentionPolicy::new("article")
            .unwrap()
            .with_min_revisions_to_keep(keep)
    }

    fn ids(revisions: &[DeletableRevision]) -> Vec<i64> {
        revisions.iter().map(|r| r.revision_id).collect()
    }

    #[test_case(EntityKind::Generic ; "generic layout")]
    #[test_case(EntityKind::Node ; "node layout")]
    fn test_keeps_newest_floor(kind: EntityKind) {
        let selector = RevisionSelector::new(store_with_five(kind));

        let deletable = selector.list_deletable(&policy(3)).unwrap();
        assert_eq!(ids(&deletable), vec![101, 102]);
        assert_eq!(selector.count_deletable(&policy(3)).unwrap(), 2);
    }

    #[test]
    fn test_min_retain_age_protects_recent_rows() {
        let selector = RevisionSelector::new(store_with_five(EntityKind::Generic));

        let p = policy(1).with_min_retain_age(Some(NOW - 35 * DAY));
        assert_eq!(ids(&selector.list_deletable(&p).unwrap()), vec![101, 102]);
    }

    #[test]
    fn test_current_revision_is_never_deletable() {
        let store = store_with_five(EntityKind::Generic);
        store.set_current_revision(1, 101).unwrap();
        let selector = RevisionSelector::new(Arc::clone(&store));

        // Floor keeps 104 and 105; 101 is protected as the current revision.
        assert_eq!(
            ids(&selector.list_deletable(&policy(2)).unwrap()),
            vec![102, 103]
        );
    }

    #[test]
    fn test_limit_takes_oldest_first() {
        let selector = RevisionSelector::new(store_with_five(EntityKind::Generic));

        let first = selector.list_deletable_limited(&policy(1), 2).unwrap();
        assert_eq!(ids(&first), vec![101, 102]);
        assert!(selector.list_deletable_limited(&policy(1), 0).unwrap().is_empty());
    }

    #[test]
    fn test_non_candidates_contribute_nothing() {
        let selector = RevisionSelector::new(store_with_five(EntityKind::Generic));
        assert_eq!(selector.count_deletable(&policy(5)).unwrap(), 0);
        assert_eq!(selector.count_deletable(&policy(9)).unwrap(), 0);
    }

    #[test]
    fn test_query_embeds_candidate_params_first() {
        let p = policy(2)
            .with_inactivity_cutoff(Some(7))
            .with_min_retain_age(Some(9));
        let query = deletable_query(EntityKind::Generic, &p).unwrap();

        assert_eq!(
            query.params(),
            &[
                QueryParam::Text("article".into()),
                QueryParam::Integer(7),
                QueryParam::Integer(2),
                QueryParam::Integer(2),
                QueryParam::Integer(9),
            ]
        );
        assert!(query.sql().contains("recency_rank > ?4"));
        assert!(query.sql().contains("revision_timestamp < ?5"));
    }

    #[test]
    fn test_revision_exactly_at_min_retain_age_is_kept() {
        let selector = RevisionSelector::new(store_with_five(EntityKind::Generic));

        // 102 sits exactly on the threshold; only strictly older rows go.
        let p = policy(1).with_min_retain_age(Some(NOW - 40 * DAY));
        assert_eq!(ids(&selector.list_deletable(&p).unwrap()), vec![101]);
        assert_eq!(selector.count_deletable(&p).unwrap(), 1);
    }
}
