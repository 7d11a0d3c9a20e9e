//! Untrack command handler.

use revprune::config::PruneConfig;
use std::path::Path;
use tracing::info;

/// Untrack command.
///
/// Removes the content type from the config file. Without `--force` the
/// command only describes what would happen.
pub fn cmd_untrack(
    mut config: PruneConfig,
    config_path: Option<&Path>,
    content_type: &str,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if config.tracked(content_type).is_none() {
        return Err(format!("content type '{content_type}' is not tracked").into());
    }

    if !force {
        println!(
            "This will delete the revision pruning configuration for '{content_type}'; \
             its revisions will no longer be deleted."
        );
        println!("Re-run with --force to apply.");
        return Ok(());
    }

    let Some(path) = config_path else {
        return Err("no config file location; pass --config".into());
    };

    config.untrack(content_type);
    config.save_to_file(path)?;
    info!(content_type, path = %path.display(), "Untracked content type");

    println!(
        "The revision pruning configuration for '{content_type}' has been deleted."
    );
    Ok(())
}
