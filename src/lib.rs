//! Cluster Review: endpoint-status review selection for document clusters
//!
//! Takes the clusters of one cluster run, groups each cluster's members by
//! their endpoint status, derives the minimal set of items a reviewer has to
//! look at, and tags that set with `ClusterReview|<run>|<cluster>`.
//!
//! # Core Concepts
//!
//! - **Clusters**: groups of items from an external clustering engine; IDs
//!   `-1` and `-2` are the `unclusterable` and `ignorable` pseudo-clusters
//! - **Review sets**: `endpoint` and `endpoint-attach` members plus the
//!   deduplicated attachments of attach-status members
//! - **Case collaborators**: the case store, descendant resolver,
//!   deduplicator and tag service are traits; `MemoryCase` and `SqliteCase`
//!   implement all four
//!
//! # Example
//!
//! ```
//! use cluster_review::{ClusterTagger, CaseStore, MemberRecord, MemoryCase, ItemId};
//!
//! let mut case = MemoryCase::new();
//! case.add_cluster("RunA", 5, vec![MemberRecord {
//!     item: ItemId::from_string("e1"),
//!     status: Some("endpoint".to_string()),
//! }]).unwrap();
//!
//! let clusters = case.list_clusters("RunA").unwrap();
//! let report = ClusterTagger::new(&case).tag_all("RunA", &clusters).unwrap();
//! assert_eq!(report.clusters[0].label, "ClusterReview|RunA|5");
//! ```

pub mod case;
mod cluster;
pub mod review;
pub mod selection;

pub use case::{
    Case, CaseError, CaseFixture, CaseResult, CaseStore, ClusterRecord, Deduplicator,
    DescendantResolver, ImportSummary, ItemRecord, MemberRecord, MemoryCase, RunRecord,
    SqliteCase, TagService,
};
pub use cluster::{
    display_id, endpoint_status, tag_label, Cluster, ClusterId, ClusterKey, ClusterRun, DisplayId,
    ItemId, TAG_PREFIX,
};
pub use review::{
    CancellationToken, ClusterOutcome, ClusterPartitioner, ClusterTagger, NoopProgress,
    ProgressSink, ReviewSet, RunStatus, StatusBuckets, TagReport, TracingProgress,
};
pub use selection::{summarize, ClusterSummary, Selection, SelectionError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
