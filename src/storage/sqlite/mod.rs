//! `SQLite` revision store.
//!
//! ## Module Structure
//!
//! - [`connection`]: lock acquisition with poison recovery, per-connection pragmas
//! - [`metrics`]: operation counters and latency histograms
//! - `store`: [`SqliteRevisionStore`], the [`RevisionStore`](crate::storage::RevisionStore) implementation

mod connection;
mod metrics;
mod store;

pub use connection::{BUSY_TIMEOUT_MS, acquire_lock, configure_connection};
pub use metrics::record_operation_metrics;
pub use store::SqliteRevisionStore;
