//! Revision pruning.
//!
//! The [`RevisionDeletionEngine`] turns a list of resolved retention
//! policies into one quota-bounded deletion pass and reports, per content
//! type, what was deleted and what is left for a later run.
//!
//! # Overview
//!
//! A pass never deletes more than its quota. Content types are processed in
//! configuration order, so earlier types are served first when the quota is
//! tight; whatever does not fit is reported as pending and picked up by the
//! next scheduled run.
//!
//! # Example
//!
//! ```rust,ignore
//! use revprune::config::PruneConfig;
//! use revprune::gc::RevisionDeletionEngine;
//! use revprune::storage::SqliteRevisionStore;
//! use std::sync::Arc;
//!
//! let config = PruneConfig::load_default();
//! let store = Arc::new(SqliteRevisionStore::open(&config.database_path, config.entity_kind)?);
//! let (policies, _issues) = config.resolve_policies(chrono::Utc::now());
//!
//! let engine = RevisionDeletionEngine::new(store);
//! let report = engine.run(&policies, config.cron.quota, false)?;
//! println!("{}", report.summary());
//! ```

mod engine;

pub use engine::RevisionDeletionEngine;
