//! Collaborator trait definitions
//!
//! The review core never implements these; it consumes them. Each backend
//! documents its own equality contract for deduplication.

use crate::cluster::{Cluster, ClusterId, ClusterKey, ClusterRun, ItemId};
use thiserror::Error;

/// Errors raised by case collaborators
#[derive(Debug, Error)]
pub enum CaseError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Fixture error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cluster run not found: {0}")]
    ClusterRunNotFound(String),

    #[error("Cluster not found: {run}-{id}")]
    ClusterNotFound { run: String, id: ClusterId },

    #[error("Invalid fixture: {0}")]
    InvalidFixture(String),

    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Service error: {0}")]
    Service(String),
}

/// Result type for collaborator operations
pub type CaseResult<T> = Result<T, CaseError>;

/// Read access to cluster runs, clusters and endpoint statuses
pub trait CaseStore {
    /// List every cluster run in the case
    fn list_cluster_runs(&self) -> CaseResult<Vec<ClusterRun>>;

    /// List the clusters of a run, sorted by raw ID
    fn list_clusters(&self, run: &str) -> CaseResult<Vec<Cluster>>;

    /// Endpoint status of an item for one run/cluster pairing.
    ///
    /// `None` when the item has no status under that key.
    fn endpoint_status(&self, item: &ItemId, key: &ClusterKey) -> CaseResult<Option<String>>;
}

/// Resolves the attachment/embedding graph below items
pub trait DescendantResolver {
    /// All descendants of the given items. Whether the inputs themselves
    /// are included is up to the implementation.
    fn find_descendants(&self, items: &[ItemId]) -> CaseResult<Vec<ItemId>>;
}

/// Reduces an item set to one representative per duplicate group
pub trait Deduplicator {
    /// Output order is not relied upon by callers.
    fn deduplicate(&self, items: &[ItemId]) -> CaseResult<Vec<ItemId>>;
}

/// Applies tag labels to items
pub trait TagService {
    /// Attach `label` to every item. Repeat application must not duplicate.
    fn apply_tag(&self, label: &str, items: &[ItemId]) -> CaseResult<()>;
}

/// Everything the tagger needs from one case session
pub trait Case: CaseStore + DescendantResolver + Deduplicator + TagService {}

impl<T: CaseStore + DescendantResolver + Deduplicator + TagService> Case for T {}
