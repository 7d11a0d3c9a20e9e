//! `SQLite` implementation of [`RevisionStore`].

use super::connection::{acquire_lock, configure_connection};
use super::metrics::observe;
use crate::models::{CandidateEntity, DeletableRevision};
use crate::storage::{EntityKind, QueryParam, RevisionStore, SelectQuery};
use crate::{Error, Result};
use rusqlite::types::ToSqlOutput;
use rusqlite::{Connection, OpenFlags, ToSql, params, params_from_iter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use tracing::{debug, instrument};

/// Revision ids bound per `DELETE` statement.
///
/// Kept well under `SQLITE_MAX_VARIABLE_NUMBER`; all chunks of one batch run
/// inside the same transaction.
const DELETE_CHUNK_SIZE: usize = 500;

impl ToSql for QueryParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Self::Integer(v) => Ok(ToSqlOutput::from(*v)),
            Self::Text(v) => Ok(ToSqlOutput::from(v.as_str())),
        }
    }
}

/// Revision store backed by a `SQLite` database.
pub struct SqliteRevisionStore {
    /// Connection to the `SQLite` database.
    conn: Mutex<Connection>,
    /// Path to the database (None for in-memory).
    db_path: Option<PathBuf>,
    /// Table layout.
    kind: EntityKind,
}

impl SqliteRevisionStore {
    /// Opens an existing content database.
    ///
    /// The schema is not touched; the tables for `kind` must already exist.
    /// A missing file is an error rather than a new empty database.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] if the database cannot be opened.
    pub fn open(db_path: impl Into<PathBuf>, kind: EntityKind) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Self::open_with_flags(db_path.into(), kind, flags)
    }

    /// Creates (or opens) a database file and ensures the schema for `kind`.
    ///
    /// Intended for new databases and fixtures only.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] if the file cannot be created or
    /// the DDL fails.
    pub fn create(db_path: impl Into<PathBuf>, kind: EntityKind) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let store = Self::open_with_flags(db_path.into(), kind, flags)?;
        store.create_schema()?;
        Ok(store)
    }

    fn open_with_flags(db_path: PathBuf, kind: EntityKind, flags: OpenFlags) -> Result<Self> {
        let conn =
            Connection::open_with_flags(&db_path, flags).map_err(|e| Error::StoreUnavailable {
                operation: "open_sqlite".to_string(),
                cause: format!("{}: {e}", db_path.display()),
            })?;
        configure_connection(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path),
            kind,
        })
    }

    /// Creates an in-memory store with a fresh schema (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory(kind: EntityKind) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::store("open_sqlite_memory", e))?;
        configure_connection(&conn)?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path: None,
            kind,
        };
        store.create_schema()?;
        Ok(store)
    }

    /// Creates the entity and revision tables if they do not exist.
    ///
    /// Intended for new databases and fixtures only.
    ///
    /// # Errors
    ///
    /// Returns an error if the DDL fails.
    pub fn create_schema(&self) -> Result<()> {
        let conn = acquire_lock(&self.conn);
        conn.execute_batch(&self.kind.create_schema_sql())
            .map_err(|e| Error::store("create_schema", e))
    }

    /// Returns the database path.
    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Inserts an entity row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_entity(
        &self,
        entity_id: i64,
        content_type: &str,
        current_revision_id: Option<i64>,
    ) -> Result<()> {
        let t = self.kind.tables();
        let conn = acquire_lock(&self.conn);
        conn.execute(
            &format!(
                "INSERT INTO {} ({}, {}, {}) VALUES (?1, ?2, ?3)",
                t.entity_table, t.entity_id, t.entity_type, t.current_revision_id
            ),
            params![entity_id, content_type, current_revision_id],
        )
        .map(|_| ())
        .map_err(|e| Error::store("insert_entity", e))
    }

    /// Inserts a revision row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_revision(&self, entity_id: i64, revision_id: i64, timestamp: i64) -> Result<()> {
        let t = self.kind.tables();
        let conn = acquire_lock(&self.conn);
        conn.execute(
            &format!(
                "INSERT INTO {} ({}, {}, {}) VALUES (?1, ?2, ?3)",
                t.revision_table, t.revision_entity_id, t.revision_id, t.revision_timestamp
            ),
            params![entity_id, revision_id, timestamp],
        )
        .map(|_| ())
        .map_err(|e| Error::store("insert_revision", e))
    }

    /// Points an entity at a new current revision.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn set_current_revision(&self, entity_id: i64, revision_id: i64) -> Result<()> {
        let t = self.kind.tables();
        let conn = acquire_lock(&self.conn);
        conn.execute(
            &format!(
                "UPDATE {} SET {} = ?1 WHERE {} = ?2",
                t.entity_table, t.current_revision_id, t.entity_id
            ),
            params![revision_id, entity_id],
        )
        .map(|_| ())
        .map_err(|e| Error::store("set_current_revision", e))
    }

    /// Number of revisions an entity currently has.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn revision_count(&self, entity_id: i64) -> Result<u64> {
        let t = self.kind.tables();
        let conn = acquire_lock(&self.conn);
        let count: i64 = conn
            .query_row(
                &format!(
                    "SELECT COUNT(*) FROM {} WHERE {} = ?1",
                    t.revision_table, t.revision_entity_id
                ),
                params![entity_id],
                |row| row.get(0),
            )
            .map_err(|e| Error::store("revision_count", e))?;
        Ok(non_negative(count))
    }
}

impl RevisionStore for SqliteRevisionStore {
    fn entity_kind(&self) -> EntityKind {
        self.kind
    }

    #[instrument(skip(self, query), fields(operation = "count"))]
    fn count(&self, query: &SelectQuery) -> Result<u64> {
        let start = Instant::now();
        let conn = acquire_lock(&self.conn);
        let result = conn
            .query_row(
                &query.count_sql(),
                params_from_iter(query.params()),
                |row| row.get::<_, i64>(0),
            )
            .map(non_negative)
            .map_err(|e| Error::store("count", e));
        observe("count", start, result)
    }

    #[instrument(skip(self, query), fields(operation = "fetch_candidates"))]
    fn fetch_candidates(&self, query: &SelectQuery) -> Result<Vec<CandidateEntity>> {
        let start = Instant::now();
        let (sql, params) = query.fetch_sql(None);
        let conn = acquire_lock(&self.conn);

        let result = (|| -> rusqlite::Result<Vec<CandidateEntity>> {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
                Ok(CandidateEntity {
                    entity_id: row.get("entity_id")?,
                    revision_count: non_negative(row.get("revision_count")?),
                })
            })?;
            rows.collect()
        })()
        .map_err(|e| Error::store("fetch_candidates", e));

        observe("fetch_candidates", start, result)
    }

    #[instrument(skip(self, query), fields(operation = "fetch_deletable"))]
    fn fetch_deletable(
        &self,
        query: &SelectQuery,
        limit: Option<u64>,
    ) -> Result<Vec<DeletableRevision>> {
        let start = Instant::now();
        let (sql, params) = query.fetch_sql(limit);
        let conn = acquire_lock(&self.conn);

        let result = (|| -> rusqlite::Result<Vec<DeletableRevision>> {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
                Ok(DeletableRevision {
                    entity_id: row.get("entity_id")?,
                    revision_id: row.get("revision_id")?,
                    timestamp: row.get("revision_timestamp")?,
                })
            })?;
            rows.collect()
        })()
        .map_err(|e| Error::store("fetch_deletable", e));

        observe("fetch_deletable", start, result)
    }

    #[instrument(skip(self, revisions), fields(operation = "delete", batch = revisions.len()))]
    fn delete_revisions(&self, revisions: &[DeletableRevision]) -> Result<u64> {
        if revisions.is_empty() {
            return Ok(0);
        }

        let start = Instant::now();
        let t = self.kind.tables();
        let mut conn = acquire_lock(&self.conn);

        let result = (|| -> rusqlite::Result<u64> {
            let tx = conn.transaction()?;
            let mut deleted = 0_u64;
            for chunk in revisions.chunks(DELETE_CHUNK_SIZE) {
                let placeholders: Vec<String> =
                    (1..=chunk.len()).map(|i| format!("?{i}")).collect();
                // The current-revision guard is re-evaluated at delete time, so a
                // pointer moved since selection still protects its row.
                let sql = format!(
                    "DELETE FROM {rev} WHERE {rid} IN ({ids}) \
                     AND {rid} NOT IN (SELECT {cur} FROM {ent} WHERE {cur} IS NOT NULL)",
                    rev = t.revision_table,
                    rid = t.revision_id,
                    ids = placeholders.join(","),
                    cur = t.current_revision_id,
                    ent = t.entity_table,
                );
                let affected =
                    tx.execute(&sql, params_from_iter(chunk.iter().map(|r| r.revision_id)))?;
                deleted += u64::try_from(affected).unwrap_or(u64::MAX);
            }
            tx.commit()?;
            Ok(deleted)
        })()
        .map_err(|e| Error::store("delete_revisions", e));

        if let Ok(deleted) = result {
            debug!(requested = revisions.len(), deleted, "Deleted revision batch");
        }
        observe("delete", start, result)
    }
}

fn non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
