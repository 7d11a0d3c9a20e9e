//! Table layouts for the supported entity kinds.
//!
//! Only one selection strategy exists; what varies between entity kinds is
//! where the two logical relations live. Identifiers here are compile-time
//! constants and are spliced into SQL text directly. Every runtime value
//! goes through a bound parameter.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Physical names for the `entity` and `entity_revision` relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevisionTables {
    /// Entity table.
    pub entity_table: &'static str,
    /// Entity primary key column.
    pub entity_id: &'static str,
    /// Content type (bundle) column.
    pub entity_type: &'static str,
    /// Pointer to the entity's current revision.
    pub current_revision_id: &'static str,
    /// Revision table.
    pub revision_table: &'static str,
    /// Owning entity column on the revision table.
    pub revision_entity_id: &'static str,
    /// Revision primary key column.
    pub revision_id: &'static str,
    /// Revision timestamp column (Unix epoch seconds).
    pub revision_timestamp: &'static str,
}

const GENERIC_TABLES: RevisionTables = RevisionTables {
    entity_table: "entity",
    entity_id: "id",
    entity_type: "type",
    current_revision_id: "current_revision_id",
    revision_table: "entity_revision",
    revision_entity_id: "entity_id",
    revision_id: "revision_id",
    revision_timestamp: "timestamp",
};

const NODE_TABLES: RevisionTables = RevisionTables {
    entity_table: "node",
    entity_id: "nid",
    entity_type: "type",
    current_revision_id: "vid",
    revision_table: "node_revision",
    revision_entity_id: "nid",
    revision_id: "vid",
    revision_timestamp: "revision_timestamp",
};

/// The kind of versioned entity being pruned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// `entity(id, type, current_revision_id)` / `entity_revision(entity_id, revision_id, timestamp)`.
    #[default]
    Generic,
    /// `node(nid, type, vid)` / `node_revision(nid, vid, revision_timestamp)`.
    Node,
}

impl EntityKind {
    /// Returns the table layout for this kind.
    #[must_use]
    pub const fn tables(self) -> &'static RevisionTables {
        match self {
            Self::Generic => &GENERIC_TABLES,
            Self::Node => &NODE_TABLES,
        }
    }

    /// Returns the kind as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Node => "node",
        }
    }

    /// DDL for a fresh store of this kind.
    ///
    /// Used for test fixtures and new databases; an existing store is never
    /// migrated.
    #[must_use]
    pub fn create_schema_sql(self) -> String {
        let t = self.tables();
        format!(
            "CREATE TABLE IF NOT EXISTS {entity} (
                {eid} INTEGER PRIMARY KEY,
                {etype} TEXT NOT NULL,
                {current} INTEGER
            );
            CREATE TABLE IF NOT EXISTS {revision} (
                {rid} INTEGER PRIMARY KEY,
                {reid} INTEGER NOT NULL,
                {ts} INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_{entity}_{etype} ON {entity}({etype});
            CREATE INDEX IF NOT EXISTS idx_{revision}_{reid}_{ts} ON {revision}({reid}, {ts} DESC);",
            entity = t.entity_table,
            eid = t.entity_id,
            etype = t.entity_type,
            current = t.current_revision_id,
            revision = t.revision_table,
            rid = t.revision_id,
            reid = t.revision_entity_id,
            ts = t.revision_timestamp,
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generic" | "entity" => Ok(Self::Generic),
            "node" => Ok(Self::Node),
            other => Err(Error::InvalidInput(format!("unknown entity kind '{other}'"))),
        }
    }
}
