//! Abstract query values.
//!
//! Selection criteria are built once into a [`SelectQuery`] and then
//! materialized in one of two modes: counted, or fetched row by row. A
//! query can also be embedded in a larger one as a derived relation, in
//! which case its placeholders keep their numbers and the outer query
//! continues the sequence.

use std::fmt;

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParam {
    /// Integer (ids, counts, timestamps).
    Integer(i64),
    /// Text (content types).
    Text(String),
}

impl From<i64> for QueryParam {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for QueryParam {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for QueryParam {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl fmt::Display for QueryParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "'{v}'"),
        }
    }
}

/// Accumulates bound parameters and hands out numbered placeholders.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    params: Vec<QueryParam>,
}

impl QueryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a builder that wraps `inner` as a derived relation.
    ///
    /// Returns the builder (already holding `inner`'s parameters) and the
    /// inner SQL text to splice into the outer query.
    #[must_use]
    pub fn wrapping(inner: SelectQuery) -> (Self, String) {
        (
            Self {
                params: inner.params,
            },
            inner.sql,
        )
    }

    /// Binds a value and returns its placeholder (`?1`, `?2`, ...).
    pub fn bind(&mut self, value: impl Into<QueryParam>) -> String {
        self.params.push(value.into());
        format!("?{}", self.params.len())
    }

    /// Finishes the query.
    #[must_use]
    pub fn build(self, sql: String) -> SelectQuery {
        SelectQuery {
            sql,
            params: self.params,
            order_by: None,
        }
    }
}

/// A select statement with its bound parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    sql: String,
    params: Vec<QueryParam>,
    order_by: Option<String>,
}

impl SelectQuery {
    /// Sets the ordering applied when rows are fetched.
    ///
    /// Counting and embedding ignore it.
    #[must_use]
    pub fn with_order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    /// The bare select text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bound parameters, in placeholder order.
    #[must_use]
    pub fn params(&self) -> &[QueryParam] {
        &self.params
    }

    /// Returns `true` if `value` is bound anywhere in the query.
    #[must_use]
    pub fn binds(&self, value: &QueryParam) -> bool {
        self.params.contains(value)
    }

    /// Count mode.
    #[must_use]
    pub fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM ({}) AS counted", self.sql)
    }

    /// Fetch mode, optionally capped at `limit` rows.
    ///
    /// Returns the statement text and the full parameter list, including
    /// the bound limit.
    #[must_use]
    pub fn fetch_sql(&self, limit: Option<u64>) -> (String, Vec<QueryParam>) {
        let mut sql = self.sql.clone();
        let mut params = self.params.clone();

        if let Some(order_by) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }
        if let Some(limit) = limit {
            params.push(QueryParam::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
            sql.push_str(&format!(" LIMIT ?{}", params.len()));
        }

        (sql, params)
    }
}
