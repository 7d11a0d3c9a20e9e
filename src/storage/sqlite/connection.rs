//! Connection handling for the `SQLite` revision store.
//!
//! Provides mutex acquisition with poison recovery and the pragmas applied to
//! every connection.

use crate::{Error, Result};
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};

/// Milliseconds `SQLite` waits on a locked database before failing.
pub const BUSY_TIMEOUT_MS: u32 = 5000;

/// Helper to acquire mutex lock with poison recovery.
///
/// If the mutex is poisoned (due to a panic in a previous critical section),
/// we recover the inner value and log a warning. An interrupted transaction
/// is rolled back by `SQLite` when its guard is dropped, so the connection is
/// still usable.
pub fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("SQLite mutex was poisoned, recovering");
            metrics::counter!("sqlite_mutex_poison_recovery_total").increment(1);
            poisoned.into_inner()
        },
    }
}

/// Configures a connection for use against a live content store.
///
/// Only session-scoped settings are applied. The journal mode of the
/// database file is left as the owning application configured it.
///
/// - **`busy_timeout`**: waits for writers from the content application
///   instead of failing with `SQLITE_BUSY`
/// - **`foreign_keys`**: enforced, so a cascading schema cleans up after
///   revision deletes
pub fn configure_connection(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "busy_timeout", BUSY_TIMEOUT_MS)
        .map_err(|e| Error::store("configure_connection", e))?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(|e| Error::store("configure_connection", e))?;
    Ok(())
}
