//! Retention selection.
//!
//! Two selectors share one rule set:
//!
//! - [`CandidateSelector`]: entities of a content type with more revisions
//!   than the minimum (and, optionally, inactive since a cutoff)
//! - [`RevisionSelector`]: the revisions of those entities beyond the
//!   newest `min_revisions_to_keep`, optionally older than a retain age
//!
//! Selection never mutates the store.

mod candidate;
mod revision;

pub use candidate::{CandidateSelector, candidate_query};
pub use revision::{RevisionSelector, deletable_query};
