//! Configuration management.
//!
//! Configuration is a TOML file. Tracked content types are an ordered
//! `[[track]]` array, and that order is the order the engine serves them in.
//!
//! ```toml
//! database_path = "site.db"
//! entity_kind = "node"
//!
//! [cron]
//! quota = 50
//! frequency = "daily"
//!
//! [minimum_age_to_delete_time]
//! max_number = 12
//! time = "months"
//!
//! [when_to_delete_time]
//! max_number = 12
//! time = "months"
//!
//! [[track]]
//! content_type = "article"
//! minimum_revisions_to_keep = 3
//! minimum_age_to_delete = 6
//! when_to_delete = 3
//! ```

mod bounds;
mod value;

pub use bounds::{BoundField, CronFrequency, TimeBound, TimeUnit};
pub use value::ConfigNumber;

use crate::models::RetentionPolicy;
use crate::storage::EntityKind;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "REVPRUNE_CONFIG_PATH";

/// Default revisions deleted per run.
pub const DEFAULT_QUOTA: u64 = 50;

/// Main configuration for revprune.
#[derive(Debug, Clone, PartialEq)]
pub struct PruneConfig {
    /// Path to the content database.
    pub database_path: PathBuf,
    /// Table layout of the content database.
    pub entity_kind: EntityKind,
    /// Scheduled run settings.
    pub cron: CronSettings,
    /// Bound for per-type `minimum_age_to_delete`.
    pub minimum_age_to_delete_time: TimeBound,
    /// Bound for per-type `when_to_delete`.
    pub when_to_delete_time: TimeBound,
    /// Logging settings.
    pub logging: LoggingSettings,
    /// Tracked content types, in processing order.
    pub track: Vec<TrackedContentType>,
}

/// Scheduled run settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CronSettings {
    /// Revisions deleted per run (at least 1).
    pub quota: u64,
    /// How often scheduled runs prune.
    pub frequency: CronFrequency,
}

impl Default for CronSettings {
    fn default() -> Self {
        Self {
            quota: DEFAULT_QUOTA,
            frequency: CronFrequency::default(),
        }
    }
}

/// Logging section, passed to [`crate::observability::LoggingConfig::from_settings`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `pretty` or `json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Filter directive, e.g. `info` or `revprune=debug`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Append log output to this file instead of stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// One tracked content type, as configured.
///
/// Values are kept raw; [`PruneConfig::resolve_policies`] validates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedContentType {
    /// Content type (bundle) name.
    pub content_type: String,
    /// Newest revisions always kept per entity.
    pub minimum_revisions_to_keep: ConfigNumber,
    /// Revisions younger than this many units are kept (0 disables).
    #[serde(default)]
    pub minimum_age_to_delete: ConfigNumber,
    /// Entities edited within this many units are skipped (0 disables).
    #[serde(default)]
    pub when_to_delete: ConfigNumber,
}

impl TrackedContentType {
    /// Creates an entry with both age filters disabled.
    #[must_use]
    pub fn new(content_type: impl Into<String>, minimum_revisions_to_keep: i64) -> Self {
        Self {
            content_type: content_type.into(),
            minimum_revisions_to_keep: ConfigNumber::from(minimum_revisions_to_keep),
            minimum_age_to_delete: ConfigNumber::default(),
            when_to_delete: ConfigNumber::default(),
        }
    }

    /// Sets the minimum age to delete.
    #[must_use]
    pub fn with_minimum_age_to_delete(mut self, value: u32) -> Self {
        self.minimum_age_to_delete = ConfigNumber::from(value);
        self
    }

    /// Sets the inactivity window.
    #[must_use]
    pub fn with_when_to_delete(mut self, value: u32) -> Self {
        self.when_to_delete = ConfigNumber::from(value);
        self
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ConfigFile {
    /// Database path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,
    /// Entity kind name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_kind: Option<String>,
    /// Cron section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron: Option<ConfigFileCron>,
    /// Minimum age bound section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_age_to_delete_time: Option<ConfigFileTimeBound>,
    /// When-to-delete bound section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when_to_delete_time: Option<ConfigFileTimeBound>,
    /// Logging section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingSettings>,
    /// Tracked content types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub track: Vec<TrackedContentType>,
}

/// Cron section in config file.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ConfigFileCron {
    /// Revisions per run.
    pub quota: Option<u64>,
    /// Frequency name.
    pub frequency: Option<String>,
}

/// Time bound section in config file.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ConfigFileTimeBound {
    /// Maximum per-type value.
    pub max_number: Option<u32>,
    /// Unit name.
    pub time: Option<String>,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("revprune.db"),
            entity_kind: EntityKind::default(),
            cron: CronSettings::default(),
            minimum_age_to_delete_time: TimeBound::default(),
            when_to_delete_time: TimeBound::default(),
            logging: LoggingSettings::default(),
            track: Vec::new(),
        }
    }
}

impl PruneConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] for malformed TOML and
    /// [`Error::InvalidInput`] for out-of-range or unknown values.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;
        Self::from_config_file(file)
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        Self::from_toml(&contents)
    }

    /// Returns the config file location.
    ///
    /// `REVPRUNE_CONFIG_PATH` wins; otherwise the platform config dir
    /// (`~/.config/revprune/config.toml` on Linux).
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("revprune").join("config.toml"))
    }

    /// Loads configuration from the default location.
    ///
    /// Returns default configuration if no config file is found or the file
    /// cannot be loaded.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                Self::default()
            },
        }
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(&ConfigFile::from(self)).map_err(|e| Error::OperationFailed {
            operation: "serialize_config".to_string(),
            cause: e.to_string(),
        })
    }

    /// Writes the configuration to a file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = self.to_toml()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
                operation: "create_config_dir".to_string(),
                cause: e.to_string(),
            })?;
        }
        std::fs::write(path, contents).map_err(|e| Error::OperationFailed {
            operation: "write_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })
    }

    /// Converts a `ConfigFile` to `PruneConfig`.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = file.database_path {
            config.database_path = PathBuf::from(path);
        }
        if let Some(kind) = file.entity_kind {
            config.entity_kind = kind.parse()?;
        }
        if let Some(cron) = file.cron {
            if let Some(quota) = cron.quota {
                if quota == 0 {
                    return Err(Error::InvalidInput(
                        "cron.quota must be at least 1".to_string(),
                    ));
                }
                config.cron.quota = quota;
            }
            if let Some(frequency) = cron.frequency {
                config.cron.frequency = frequency.parse()?;
            }
        }
        if let Some(bound) = file.minimum_age_to_delete_time {
            config.minimum_age_to_delete_time =
                merge_bound(config.minimum_age_to_delete_time, bound)?;
        }
        if let Some(bound) = file.when_to_delete_time {
            config.when_to_delete_time = merge_bound(config.when_to_delete_time, bound)?;
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }
        config.track = file.track;

        Ok(config)
    }

    /// Resolves tracked content types into retention policies.
    ///
    /// Per-type age values are clamped to their global `max_number` and
    /// turned into "N units ago" relative to `now`. Entries with an empty
    /// name, an unusable number, or a content type already resolved are
    /// skipped and returned as issues.
    #[must_use]
    pub fn resolve_policies(&self, now: DateTime<Utc>) -> (Vec<RetentionPolicy>, Vec<Error>) {
        let mut policies = Vec::with_capacity(self.track.len());
        let mut issues = Vec::new();

        for resolved in self.resolve_entries(now) {
            match resolved {
                Ok(policy) => policies.push(policy),
                Err(e) => issues.push(e),
            }
        }

        (policies, issues)
    }

    /// Resolves each `[[track]]` entry, one result per entry in file order.
    ///
    /// A content type repeated after a valid entry is an
    /// [`Error::InvalidPolicy`].
    #[must_use]
    pub fn resolve_entries(&self, now: DateTime<Utc>) -> Vec<Result<RetentionPolicy>> {
        let mut seen = HashSet::new();

        self.track
            .iter()
            .map(|entry| {
                let resolved = self.resolve_entry(entry, now, &seen);
                match &resolved {
                    Ok(policy) => {
                        seen.insert(policy.content_type().to_string());
                    },
                    Err(e) => warn!(
                        content_type = %entry.content_type,
                        error = %e,
                        "Skipping invalid tracked content type"
                    ),
                }
                resolved
            })
            .collect()
    }

    fn resolve_entry(
        &self,
        entry: &TrackedContentType,
        now: DateTime<Utc>,
        seen: &HashSet<String>,
    ) -> Result<RetentionPolicy> {
        let policy = RetentionPolicy::new(entry.content_type.trim())?;
        if seen.contains(policy.content_type()) {
            return Err(invalid_entry(entry, "content type is tracked more than once".to_string()));
        }

        let policy = match &entry.minimum_revisions_to_keep {
            ConfigNumber::Integer(n) => policy.with_min_revisions_to_keep(*n),
            ConfigNumber::Text(text) => policy.with_min_revisions_to_keep_str(text),
            ConfigNumber::Other(_) => policy,
        };
        if !policy.is_active() {
            return Err(invalid_entry(
                entry,
                format!(
                    "minimum_revisions_to_keep must be a whole number of at least 1, got {}",
                    entry.minimum_revisions_to_keep
                ),
            ));
        }

        let minimum_age = count_field(entry, "minimum_age_to_delete", &entry.minimum_age_to_delete)?;
        let when_to_delete = count_field(entry, "when_to_delete", &entry.when_to_delete)?;

        Ok(policy
            .with_min_retain_age(self.minimum_age_to_delete_time.threshold(minimum_age, now))
            .with_inactivity_cutoff(self.when_to_delete_time.threshold(when_to_delete, now)))
    }

    /// Looks up a tracked content type.
    #[must_use]
    pub fn tracked(&self, content_type: &str) -> Option<&TrackedContentType> {
        self.track.iter().find(|t| t.content_type == content_type)
    }

    /// Stops tracking a content type.
    ///
    /// Returns `true` if an entry was removed.
    pub fn untrack(&mut self, content_type: &str) -> bool {
        let before = self.track.len();
        self.track.retain(|t| t.content_type != content_type);
        self.track.len() != before
    }

    /// Changes a global `max_number`.
    ///
    /// Per-type values above the new bound are lowered to it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `max_number` is 0.
    pub fn set_max_number(&mut self, field: BoundField, max_number: u32) -> Result<()> {
        let bound = match field {
            BoundField::MinimumAgeToDelete => &mut self.minimum_age_to_delete_time,
            BoundField::WhenToDelete => &mut self.when_to_delete_time,
        };
        *bound = TimeBound::new(max_number, bound.time)?;

        for entry in &mut self.track {
            let value = match field {
                BoundField::MinimumAgeToDelete => &mut entry.minimum_age_to_delete,
                BoundField::WhenToDelete => &mut entry.when_to_delete,
            };
            if value.as_count().is_some_and(|n| n > max_number) {
                *value = ConfigNumber::from(max_number);
            }
        }
        Ok(())
    }

    /// Sets the database path.
    #[must_use]
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    /// Sets the entity kind.
    #[must_use]
    pub const fn with_entity_kind(mut self, kind: EntityKind) -> Self {
        self.entity_kind = kind;
        self
    }

    /// Appends a tracked content type.
    #[must_use]
    pub fn with_tracked(mut self, entry: TrackedContentType) -> Self {
        self.track.push(entry);
        self
    }
}

fn invalid_entry(entry: &TrackedContentType, reason: String) -> Error {
    Error::InvalidPolicy {
        content_type: entry.content_type.clone(),
        reason,
    }
}

fn count_field(entry: &TrackedContentType, field: &str, value: &ConfigNumber) -> Result<u32> {
    value.as_count().ok_or_else(|| {
        invalid_entry(
            entry,
            format!("{field} must be a non-negative whole number, got {value}"),
        )
    })
}

fn merge_bound(current: TimeBound, file: ConfigFileTimeBound) -> Result<TimeBound> {
    let time = match file.time {
        Some(time) => time.parse()?,
        None => current.time,
    };
    TimeBound::new(file.max_number.unwrap_or(current.max_number), time)
}

impl From<&PruneConfig> for ConfigFile {
    fn from(config: &PruneConfig) -> Self {
        let bound = |b: &TimeBound| ConfigFileTimeBound {
            max_number: Some(b.max_number),
            time: Some(b.time.as_str().to_string()),
        };
        Self {
            database_path: Some(config.database_path.display().to_string()),
            entity_kind: Some(config.entity_kind.as_str().to_string()),
            cron: Some(ConfigFileCron {
                quota: Some(config.cron.quota),
                frequency: Some(config.cron.frequency.as_str().to_string()),
            }),
            minimum_age_to_delete_time: Some(bound(&config.minimum_age_to_delete_time)),
            when_to_delete_time: Some(bound(&config.when_to_delete_time)),
            logging: (config.logging != LoggingSettings::default())
                .then(|| config.logging.clone()),
            track: config.track.clone(),
        }
    }
}
