//! Storage backend traits.

mod revision;

pub use revision::RevisionStore;
