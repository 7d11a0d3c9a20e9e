//! Inspect command handler.
//!
//! Lists what the selectors return for one tracked content type without
//! deleting anything.

use super::{format_timestamp, open_store};
use revprune::config::PruneConfig;
use revprune::{
    CandidateEntity, CandidateSelector, DeletableRevision, Error, RetentionPolicy,
    RevisionSelector,
};

/// Inspect command implementation.
pub fn cmd_inspect(
    config: &PruneConfig,
    content_type: &str,
    revisions: bool,
    limit: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let policy = find_policy(config, content_type)?;
    let store = open_store(config)?;

    if revisions {
        let selector = RevisionSelector::new(store);
        let rows = match limit {
            Some(limit) => selector.list_deletable_limited(&policy, limit)?,
            None => selector.list_deletable(&policy)?,
        };
        display_revisions(content_type, &rows);
    } else {
        let rows = CandidateSelector::new(store).list_candidates(&policy)?;
        display_candidates(content_type, &rows);
    }

    Ok(())
}

/// Resolves the policy for one tracked content type.
fn find_policy(
    config: &PruneConfig,
    content_type: &str,
) -> Result<RetentionPolicy, Box<dyn std::error::Error>> {
    if config.tracked(content_type).is_none() {
        return Err(format!("content type '{content_type}' is not tracked").into());
    }

    let (policies, issues) = config.resolve_policies(chrono::Utc::now());
    if let Some(policy) = policies.into_iter().find(|p| p.content_type() == content_type) {
        return Ok(policy);
    }
    let reason = issues
        .into_iter()
        .find(|e| matches!(e, Error::InvalidPolicy { content_type: ct, .. } if ct.trim() == content_type))
        .map_or_else(|| "invalid policy".to_string(), |e| e.to_string());
    Err(reason.into())
}

fn display_candidates(content_type: &str, rows: &[CandidateEntity]) {
    if rows.is_empty() {
        println!("No candidate entities for '{content_type}'.");
        return;
    }

    println!("{:>12} {:>10}", "ENTITY", "REVISIONS");
    for row in rows {
        println!("{:>12} {:>10}", row.entity_id, row.revision_count);
    }
    println!();
    println!("{} candidate entities for '{content_type}'", rows.len());
}

fn display_revisions(content_type: &str, rows: &[DeletableRevision]) {
    if rows.is_empty() {
        println!("No deletable revisions for '{content_type}'.");
        return;
    }

    println!("{:>12} {:>12}  {}", "ENTITY", "REVISION", "CREATED");
    for row in rows {
        println!(
            "{:>12} {:>12}  {}",
            row.entity_id,
            row.revision_id,
            format_timestamp(row.timestamp)
        );
    }
    println!();
    println!("{} deletable revisions for '{content_type}'", rows.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use revprune::config::TrackedContentType;

    #[test]
    fn test_untracked_type_is_rejected() {
        let config = PruneConfig::new().with_tracked(TrackedContentType::new("article", 3));
        let err = find_policy(&config, "page").unwrap_err();
        assert!(err.to_string().contains("not tracked"));
    }

    #[test]
    fn test_invalid_tracked_type_reports_reason() {
        let config = PruneConfig::new().with_tracked(TrackedContentType::new("page", 0));
        let err = find_policy(&config, "page").unwrap_err();
        assert!(err.to_string().contains("minimum_revisions_to_keep"));
    }

    #[test]
    fn test_display_helpers() {
        display_candidates("article", &[]);
        display_candidates(
            "article",
            &[CandidateEntity {
                entity_id: 1,
                revision_count: 4,
            }],
        );
        display_revisions(
            "article",
            &[DeletableRevision {
                entity_id: 1,
                revision_id: 10,
                timestamp: 0,
            }],
        );
    }
}
