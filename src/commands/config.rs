//! Config command handler.
//!
//! Shows where configuration was loaded from, the effective settings, and
//! the thresholds each tracked content type resolves to right now.

use super::format_timestamp;
use revprune::config::PruneConfig;
use std::path::Path;

/// Config command.
pub fn cmd_config(
    config: &PruneConfig,
    config_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Current Configuration");
    println!("=====================");
    println!();

    match config_path {
        Some(path) if path.exists() => println!("Config File: {}", path.display()),
        Some(path) => println!("Config File: {} (not found, using defaults)", path.display()),
        None => println!("Config File: (none - using defaults)"),
    }
    println!();

    println!("{}", config.to_toml()?);

    let (policies, issues) = config.resolve_policies(chrono::Utc::now());
    if !policies.is_empty() {
        println!("Resolved Policies:");
        for policy in &policies {
            println!(
                "  {}: keep {}, delete older than {}, skip if edited after {}",
                policy.content_type(),
                policy.min_revisions_to_keep().unwrap_or_default(),
                policy
                    .min_retain_age()
                    .map_or_else(|| "(any age)".to_string(), format_timestamp),
                policy
                    .inactivity_cutoff()
                    .map_or_else(|| "(never)".to_string(), format_timestamp),
            );
        }
    }
    for issue in &issues {
        println!("  skipped: {issue}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use revprune::config::TrackedContentType;

    #[test]
    fn test_cmd_config_prints() {
        let config = PruneConfig::new()
            .with_tracked(TrackedContentType::new("article", 3).with_when_to_delete(2))
            .with_tracked(TrackedContentType::new("page", 0));

        // Just verify it doesn't fail
        cmd_config(&config, None).unwrap();
    }
}
