//! Retention policy for one content type.

use crate::{Error, Result};
use serde::Serialize;

/// Validated retention parameters for one tracked content type.
///
/// Thresholds are whole-second Unix timestamps that have already been
/// resolved from "N units ago" by the configuration layer, so a policy is
/// evaluated against a single fixed instant.
///
/// # Example
///
/// ```rust
/// use revprune::RetentionPolicy;
///
/// let policy = RetentionPolicy::new("article")
///     .unwrap()
///     .with_min_revisions_to_keep(3)
///     .with_min_retain_age(Some(1_700_000_000));
///
/// assert_eq!(policy.min_revisions_to_keep(), Some(3));
///
/// // Invalid values are ignored and the previous minimum stays in place.
/// let policy = policy.with_min_revisions_to_keep(0);
/// assert_eq!(policy.min_revisions_to_keep(), Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetentionPolicy {
    content_type: String,
    min_revisions_to_keep: Option<u32>,
    min_retain_age: Option<i64>,
    inactivity_cutoff: Option<i64>,
}

impl RetentionPolicy {
    /// Creates a policy for a content type with no minimum and no filters.
    ///
    /// A policy without a minimum selects nothing until
    /// [`with_min_revisions_to_keep`](Self::with_min_revisions_to_keep) sets one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPolicy`] if the content type is empty.
    pub fn new(content_type: impl Into<String>) -> Result<Self> {
        let content_type = content_type.into();
        if content_type.trim().is_empty() {
            return Err(Error::InvalidPolicy {
                content_type,
                reason: "content type must not be empty".to_string(),
            });
        }

        Ok(Self {
            content_type,
            min_revisions_to_keep: None,
            min_retain_age: None,
            inactivity_cutoff: None,
        })
    }

    /// Sets the minimum number of revisions to keep per entity.
    ///
    /// Values below 1 or above `u32::MAX` are ignored.
    #[must_use]
    pub fn with_min_revisions_to_keep(mut self, value: i64) -> Self {
        if let Some(valid) = validate_minimum(value) {
            self.min_revisions_to_keep = Some(valid);
        }
        self
    }

    /// Sets the minimum from raw text, as entered by an administrator.
    ///
    /// Non-numeric input is ignored the same way out-of-range input is.
    #[must_use]
    pub fn with_min_revisions_to_keep_str(self, value: &str) -> Self {
        match value.trim().parse::<i64>() {
            Ok(parsed) => self.with_min_revisions_to_keep(parsed),
            Err(_) => self,
        }
    }

    /// Sets the instant below which revisions become deletable.
    ///
    /// Revisions at or after this timestamp are never deleted. `None`
    /// disables the age filter.
    #[must_use]
    pub const fn with_min_retain_age(mut self, threshold: Option<i64>) -> Self {
        self.min_retain_age = threshold;
        self
    }

    /// Sets the inactivity cutoff.
    ///
    /// Entities whose current revision is at or after this timestamp are
    /// excluded entirely. `None` disables the filter.
    #[must_use]
    pub const fn with_inactivity_cutoff(mut self, cutoff: Option<i64>) -> Self {
        self.inactivity_cutoff = cutoff;
        self
    }

    /// The tracked content type.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Minimum revisions kept per entity, if one has been set.
    #[must_use]
    pub const fn min_revisions_to_keep(&self) -> Option<u32> {
        self.min_revisions_to_keep
    }

    /// Age threshold for individual revisions.
    #[must_use]
    pub const fn min_retain_age(&self) -> Option<i64> {
        self.min_retain_age
    }

    /// Inactivity threshold for whole entities.
    #[must_use]
    pub const fn inactivity_cutoff(&self) -> Option<i64> {
        self.inactivity_cutoff
    }

    /// Returns `true` if the policy can select anything at all.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.min_revisions_to_keep.is_some()
    }
}

fn validate_minimum(value: i64) -> Option<u32> {
    if value < 1 {
        return None;
    }
    u32::try_from(value).ok()
}
