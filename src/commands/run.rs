//! Run command handler.
//!
//! Resolves the tracked content types, runs one deletion pass, and prints
//! the report.

use super::{OutputFormat, open_store};
use revprune::config::PruneConfig;
use revprune::{DeletionReport, RevisionDeletionEngine};

/// Run command implementation.
///
/// # Examples
///
/// ```bash
/// # See what the next scheduled run would delete
/// revprune run --dry-run
///
/// # Delete up to 500 revisions and emit the report as JSON
/// revprune run --quota 500 --format json
/// ```
pub fn cmd_run(
    config: &PruneConfig,
    dry_run: bool,
    quota: Option<u64>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let quota = quota.unwrap_or(config.cron.quota);
    if quota == 0 {
        return Err("quota must be at least 1".into());
    }

    let (policies, issues) = config.resolve_policies(chrono::Utc::now());
    for issue in &issues {
        eprintln!("Skipping: {issue}");
    }

    let store = open_store(config)?;
    let engine = RevisionDeletionEngine::new(store);
    let report = engine.run(&policies, quota, dry_run)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => display_report(&report),
    }

    Ok(())
}

/// Displays the deletion report to the user.
fn display_report(report: &DeletionReport) {
    println!("Revision Prune");
    println!("==============");
    println!();
    println!("Run: {}", report.run_id);
    println!("Mode: {}", if report.dry_run { "dry-run" } else { "execute" });
    println!("Quota: {}", report.quota);
    println!();

    if !report.per_content_type.is_empty() {
        println!(
            "{:<24} {:>10} {:>10} {:>10} {:>10}",
            "CONTENT TYPE", "ENTITIES", "DELETABLE", "DELETED", "PENDING"
        );
        for entry in &report.per_content_type {
            println!(
                "{:<24} {:>10} {:>10} {:>10} {:>10}",
                entry.content_type,
                entry.candidate_entities,
                entry.deletable,
                entry.deleted,
                entry.pending
            );
            if let Some(error) = &entry.error {
                println!("  error: {error}");
            }
        }
        println!();
    }

    println!("{}", report.summary());

    if report.dry_run {
        println!();
        println!("This was a dry run. Run without --dry-run to apply changes.");
    }
}
