//! Command handlers module.
//!
//! This module organizes the CLI command implementations into separate files:
//! - `status.rs`: tracked content types with live counts
//! - `run.rs`: the deletion pass
//! - `inspect.rs`: candidate and deletable listings
//! - `untrack.rs`: removing a content type from the config file
//! - `config.rs`: configuration display

mod config;
mod inspect;
mod run;
mod status;
mod untrack;

pub use config::cmd_config;
pub use inspect::cmd_inspect;
pub use run::cmd_run;
pub use status::cmd_status;
pub use untrack::cmd_untrack;

use clap::ValueEnum;
use revprune::config::PruneConfig;
use revprune::storage::SqliteRevisionStore;
use std::sync::Arc;

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Opens the configured content database.
fn open_store(config: &PruneConfig) -> Result<Arc<SqliteRevisionStore>, Box<dyn std::error::Error>> {
    let store = SqliteRevisionStore::open(&config.database_path, config.entity_kind)?;
    Ok(Arc::new(store))
}

/// Formats a Unix timestamp for display.
fn format_timestamp(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0).map_or_else(
        || ts.to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
        assert_eq!(format_timestamp(i64::MAX), i64::MAX.to_string());
    }

    #[test]
    fn test_open_store_requires_existing_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typo.db");
        let config = PruneConfig::new().with_database_path(&path);

        let err = open_store(&config).err().unwrap();
        assert!(err.to_string().contains("typo.db"));
        assert!(!path.exists());
    }
}
