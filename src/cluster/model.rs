//! Clusters, cluster runs, and the keys and labels derived from them

use super::id::{ClusterId, DisplayId};
use super::item::ItemId;
use serde::{Deserialize, Serialize};

/// Prefix of every review tag label
pub const TAG_PREFIX: &str = "ClusterReview";

/// Well-known endpoint status values.
///
/// Statuses are assigned outside this crate and are open-ended strings;
/// only these three drive review selection.
pub mod endpoint_status {
    /// Final message of a thread
    pub const ENDPOINT: &str = "endpoint";
    /// Final message of a thread that carries attachments
    pub const ENDPOINT_ATTACH: &str = "endpoint-attach";
    /// Mid-thread message that carries attachments
    pub const THREAD_ATTACH: &str = "thread-attach";
}

/// A group of items produced by the clustering engine for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: ClusterId,
    /// Member items in engine order
    pub members: Vec<ItemId>,
}

impl Cluster {
    pub fn new(id: impl Into<ClusterId>, members: Vec<ItemId>) -> Self {
        Self {
            id: id.into(),
            members,
        }
    }

    pub fn display_id(&self) -> DisplayId {
        self.id.display_id()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// A named execution of the clustering engine over a case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRun {
    pub name: String,
    pub cluster_count: usize,
}

/// Key under which an item's endpoint status is recorded.
///
/// Holds the run name and raw cluster ID as separate fields, so distinct
/// run/cluster pairs never collide. Displays as `<run>-<raw id>`, e.g.
/// `RunA--1` for the unclusterable pseudo-cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClusterKey {
    run: String,
    cluster: ClusterId,
}

impl ClusterKey {
    pub fn new(run: &str, cluster: ClusterId) -> Self {
        Self {
            run: run.to_string(),
            cluster,
        }
    }

    pub fn run(&self) -> &str {
        &self.run
    }

    pub fn cluster(&self) -> ClusterId {
        self.cluster
    }
}

impl std::fmt::Display for ClusterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.run, self.cluster)
    }
}

/// Build the review tag label for a cluster: `ClusterReview|<run>|<display id>`.
pub fn tag_label(run: &str, cluster: DisplayId) -> String {
    format!("{}|{}|{}", TAG_PREFIX, run, cluster)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_label_uses_display_id() {
        assert_eq!(tag_label("RunA", DisplayId::Numbered(5)), "ClusterReview|RunA|5");
        assert_eq!(
            tag_label("RunA", DisplayId::Unclusterable),
            "ClusterReview|RunA|unclusterable"
        );
        assert_eq!(
            tag_label("RunA", DisplayId::Ignorable),
            "ClusterReview|RunA|ignorable"
        );
    }

    #[test]
    fn tag_label_is_deterministic() {
        let a = tag_label("Run B", ClusterId::new(12).display_id());
        let b = tag_label("Run B", ClusterId::new(12).display_id());
        assert_eq!(a, b);
    }

    #[test]
    fn cluster_key_uses_raw_id() {
        assert_eq!(ClusterKey::new("RunA", ClusterId::new(5)).to_string(), "RunA-5");
        assert_eq!(ClusterKey::new("RunA", ClusterId::UNCLUSTERABLE).to_string(), "RunA--1");
    }

    #[test]
    fn keys_with_equal_text_stay_distinct() {
        let a = ClusterKey::new("R", ClusterId::UNCLUSTERABLE);
        let b = ClusterKey::new("R-", ClusterId::new(1));
        assert_eq!(a.to_string(), b.to_string());
        assert_ne!(a, b);
        assert_eq!(b.run(), "R-");
        assert_eq!(b.cluster(), ClusterId::new(1));
    }

    #[test]
    fn cluster_display_id_follows_raw_id() {
        let c = Cluster::new(-2, vec![ItemId::from_string("a")]);
        assert_eq!(c.display_id(), DisplayId::Ignorable);
        assert_eq!(c.len(), 1);
        assert!(!c.is_empty());
    }
}
