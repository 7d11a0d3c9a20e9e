//! Status command handler.

use super::open_store;
use revprune::config::{PruneConfig, TrackedContentType};
use revprune::{CandidateSelector, RetentionPolicy, RevisionSelector};
use std::sync::Arc;

/// One row of the status table.
struct StatusRow {
    content_type: String,
    minimum: String,
    minimum_age: String,
    when_to_delete: String,
    candidates: String,
    deletable: String,
}

/// Status command.
///
/// Prints one row per tracked content type with its settings and the live
/// candidate and deletable counts.
pub fn cmd_status(config: &PruneConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("Revprune Status");
    println!("===============");
    println!();
    println!("Database: {}", config.database_path.display());
    println!("Entity kind: {}", config.entity_kind);
    println!(
        "Schedule: {} revisions per run, {}",
        config.cron.quota, config.cron.frequency
    );
    println!();

    if config.track.is_empty() {
        println!("No content types are tracked.");
        return Ok(());
    }

    let store = open_store(config)?;
    let candidates = CandidateSelector::new(Arc::clone(&store));
    let revisions = RevisionSelector::new(store);
    let resolved = config.resolve_entries(chrono::Utc::now());

    let rows = status_rows(config, &resolved, |p| {
        (candidates.count_candidates(p), revisions.count_deletable(p))
    });

    display_rows(&rows);
    Ok(())
}

/// Builds one row per `[[track]]` entry, paired with that entry's own policy.
fn status_rows<E: std::fmt::Display>(
    config: &PruneConfig,
    resolved: &[revprune::Result<RetentionPolicy>],
    count: impl Fn(&RetentionPolicy) -> (Result<u64, E>, Result<u64, E>),
) -> Vec<StatusRow> {
    config
        .track
        .iter()
        .zip(resolved)
        .map(|(entry, policy)| status_row(config, entry, policy.as_ref().ok(), &count))
        .collect()
}

/// Builds a status row; `count` is only called for a valid policy.
fn status_row<E: std::fmt::Display>(
    config: &PruneConfig,
    entry: &TrackedContentType,
    policy: Option<&RetentionPolicy>,
    count: impl FnOnce(&RetentionPolicy) -> (Result<u64, E>, Result<u64, E>),
) -> StatusRow {
    let minimum_age = match entry.minimum_age_to_delete.as_count() {
        Some(0) => "None".to_string(),
        Some(n) => config.minimum_age_to_delete_time.describe(n),
        None => entry.minimum_age_to_delete.to_string(),
    };
    let when_to_delete = match entry.when_to_delete.as_count() {
        Some(0) => "Always delete".to_string(),
        Some(n) => config.when_to_delete_time.describe(n),
        None => entry.when_to_delete.to_string(),
    };

    let (candidates, deletable) = match policy {
        Some(policy) => {
            let (c, d) = count(policy);
            (display_count(c), display_count(d))
        },
        None => ("invalid".to_string(), "-".to_string()),
    };

    StatusRow {
        content_type: entry.content_type.clone(),
        minimum: entry.minimum_revisions_to_keep.to_string(),
        minimum_age,
        when_to_delete,
        candidates,
        deletable,
    }
}

fn display_count<E: std::fmt::Display>(count: Result<u64, E>) -> String {
    match count {
        Ok(n) => n.to_string(),
        Err(e) => format!("error: {e}"),
    }
}

fn display_rows(rows: &[StatusRow]) {
    println!(
        "{:<20} {:>8} {:<14} {:<14} {:>10} {:>10}",
        "CONTENT TYPE", "MINIMUM", "MINIMUM AGE", "WHEN", "CANDIDATES", "DELETABLE"
    );
    for row in rows {
        println!(
            "{:<20} {:>8} {:<14} {:<14} {:>10} {:>10}",
            row.content_type,
            row.minimum,
            row.minimum_age,
            row.when_to_delete,
            row.candidates,
            row.deletable
        );
    }
}
