//! Time bounds and schedule frequency.

use crate::{Error, Result};
use chrono::{DateTime, Months, TimeDelta, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Unit for "N units ago" thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Calendar days.
    Days,
    /// Seven-day weeks.
    Weeks,
    /// Calendar months.
    #[default]
    Months,
}

impl TimeUnit {
    /// Returns the unit as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
        }
    }

    /// Resolves `n` units before `now` to a Unix timestamp.
    ///
    /// Months use calendar arithmetic, clamping to the last day of shorter
    /// months (March 31 minus one month is February 28 or 29). An
    /// unrepresentable result saturates to `i64::MIN`, which no revision is
    /// older than.
    #[must_use]
    pub fn ago(self, now: DateTime<Utc>, n: u32) -> i64 {
        let resolved = match self {
            Self::Days => TimeDelta::try_days(i64::from(n)).and_then(|d| now.checked_sub_signed(d)),
            Self::Weeks => {
                TimeDelta::try_weeks(i64::from(n)).and_then(|d| now.checked_sub_signed(d))
            },
            Self::Months => now.checked_sub_months(Months::new(n)),
        };
        resolved.map_or(i64::MIN, |t| t.timestamp())
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "days" | "day" => Ok(Self::Days),
            "weeks" | "week" => Ok(Self::Weeks),
            "months" | "month" => Ok(Self::Months),
            other => Err(Error::InvalidInput(format!(
                "unknown time unit '{other}' (expected days, weeks, or months)"
            ))),
        }
    }
}

/// Global upper bound for a per-content-type age setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeBound {
    /// Largest value a content type may configure.
    pub max_number: u32,
    /// Unit every content type's value is expressed in.
    pub time: TimeUnit,
}

impl Default for TimeBound {
    fn default() -> Self {
        Self {
            max_number: 12,
            time: TimeUnit::Months,
        }
    }
}

impl TimeBound {
    /// Creates a bound.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `max_number` is 0.
    pub fn new(max_number: u32, time: TimeUnit) -> Result<Self> {
        if max_number == 0 {
            return Err(Error::InvalidInput(
                "max_number must be at least 1".to_string(),
            ));
        }
        Ok(Self { max_number, time })
    }

    /// Clamps a per-type value to this bound.
    #[must_use]
    pub fn clamp(&self, value: u32) -> u32 {
        value.min(self.max_number)
    }

    /// Resolves a per-type value to a threshold timestamp.
    ///
    /// Returns `None` for 0, which disables the filter.
    #[must_use]
    pub fn threshold(&self, value: u32, now: DateTime<Utc>) -> Option<i64> {
        match self.clamp(value) {
            0 => None,
            n => Some(self.time.ago(now, n)),
        }
    }

    /// Human-readable form of a per-type value, e.g. `6 months`.
    #[must_use]
    pub fn describe(&self, value: u32) -> String {
        format!("{} {}", self.clamp(value), self.time)
    }
}

/// Which global bound a setting refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundField {
    /// `[minimum_age_to_delete_time]`.
    MinimumAgeToDelete,
    /// `[when_to_delete_time]`.
    WhenToDelete,
}

/// How often scheduled runs should prune.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CronFrequency {
    /// Every scheduler tick.
    EveryRun,
    /// At most once per hour.
    Hourly,
    /// At most once per day.
    #[default]
    Daily,
    /// At most once per week.
    Weekly,
    /// At most once per 30 days.
    Monthly,
}

impl CronFrequency {
    /// Returns the frequency as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EveryRun => "every_run",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Minimum seconds between two runs.
    #[must_use]
    pub const fn interval_secs(self) -> i64 {
        match self {
            Self::EveryRun => 0,
            Self::Hourly => 3_600,
            Self::Daily => 86_400,
            Self::Weekly => 604_800,
            Self::Monthly => 2_592_000,
        }
    }

    /// Returns `true` if a run is due at `now` given the last run time.
    ///
    /// A schedule that has never run is always due.
    #[must_use]
    pub fn is_due(self, last_run: Option<i64>, now: i64) -> bool {
        last_run.is_none_or(|last| now.saturating_sub(last) >= self.interval_secs())
    }
}

impl fmt::Display for CronFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CronFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "every_run" | "always" => Ok(Self::EveryRun),
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(Error::InvalidInput(format!("unknown frequency '{other}'"))),
        }
    }
}
