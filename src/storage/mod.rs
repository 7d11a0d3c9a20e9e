//! Storage layer abstraction.
//!
//! The revision store holds two logical relations: `entity` (id, type,
//! current revision pointer) and `entity_revision` (owning entity, revision
//! id, timestamp). The core only reads from them and deletes revision rows;
//! it never migrates an existing schema.

// Allow significant_drop_tightening - dropping database connections slightly early
// provides no meaningful benefit.
#![allow(clippy::significant_drop_tightening)]
// Allow redundant_closure_call for the rusqlite error-scoping closures.
#![allow(clippy::redundant_closure_call)]

pub mod query;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use query::{QueryBuilder, QueryParam, SelectQuery};
pub use schema::{EntityKind, RevisionTables};
pub use sqlite::SqliteRevisionStore;
pub use traits::RevisionStore;
