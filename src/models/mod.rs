//! Data models for revprune.
//!
//! Policies are created by the configuration layer and are read-only to the
//! selectors. Candidate and deletable rows are recomputed on every pass and
//! never persisted.

mod policy;
mod report;
mod revision;

pub use policy::RetentionPolicy;
pub use report::{ContentTypeReport, DeletionReport};
pub use revision::{CandidateEntity, DeletableRevision};
