//! Case collaborators
//!
//! The review core reads clusters and statuses, resolves descendants,
//! deduplicates and tags through the traits in this module. Two backends are
//! provided: `MemoryCase` for embedding and tests, `SqliteCase` for a
//! persistent case database.

mod fixture;
mod memory;
mod sqlite;
mod traits;

pub use fixture::{CaseFixture, ClusterRecord, ItemRecord, MemberRecord, RunRecord};
pub use memory::MemoryCase;
pub use sqlite::{ImportSummary, SqliteCase};
pub use traits::{
    Case, CaseError, CaseResult, CaseStore, Deduplicator, DescendantResolver, TagService,
};
