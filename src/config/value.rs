//! Numeric settings read leniently from the config file.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A numeric `[[track]]` setting as written by an administrator.
///
/// Quoted numbers, words and negative values are kept as written so that one
/// bad entry cannot reject the whole file.
/// [`PruneConfig::resolve_policies`](super::PruneConfig::resolve_policies)
/// decides whether a value is usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigNumber {
    /// A TOML integer.
    Integer(i64),
    /// A TOML string.
    Text(String),
    /// Any other TOML value (float, boolean, array, table).
    Other(toml::Value),
}

impl ConfigNumber {
    /// Returns the value as a non-negative count, if it is one.
    ///
    /// Text is trimmed before parsing.
    #[must_use]
    pub fn as_count(&self) -> Option<u32> {
        match self {
            Self::Integer(n) => u32::try_from(*n).ok(),
            Self::Text(text) => text.trim().parse().ok(),
            Self::Other(_) => None,
        }
    }
}

impl Default for ConfigNumber {
    fn default() -> Self {
        Self::Integer(0)
    }
}

impl From<i64> for ConfigNumber {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for ConfigNumber {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl fmt::Display for ConfigNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(text) => write!(f, "{text:?}"),
            Self::Other(value) => write!(f, "{value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[derive(Debug, Deserialize)]
    struct Entry {
        value: ConfigNumber,
    }

    fn parse(raw: &str) -> ConfigNumber {
        toml::from_str::<Entry>(&format!("value = {raw}")).unwrap().value
    }

    #[test_case("4", Some(4) ; "integer")]
    #[test_case("\" 6 \"", Some(6) ; "quoted")]
    #[test_case("\"three\"", None ; "words")]
    #[test_case("-2", None ; "negative")]
    #[test_case("2.5", None ; "float")]
    #[test_case("true", None ; "boolean")]
    fn test_any_scalar_parses(raw: &str, expected: Option<u32>) {
        assert_eq!(parse(raw).as_count(), expected);
    }

    #[test]
    fn test_display_keeps_original_form() {
        assert_eq!(ConfigNumber::from(3_i64).to_string(), "3");
        assert_eq!(ConfigNumber::Text("three".to_string()).to_string(), "\"three\"");
    }
}
