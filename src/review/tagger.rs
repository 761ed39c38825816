//! ClusterTagger: tags each selected cluster's review set
//!
//! Clusters are processed one at a time in the order given. Between
//! clusters the cancellation token is polled; a cancelled run stops before
//! the next cluster and reports itself as aborted. Collaborator errors stop
//! the run immediately and are returned unchanged.

use super::cancel::CancellationToken;
use super::partition::ClusterPartitioner;
use super::progress::{NoopProgress, ProgressSink};
use crate::case::{Case, CaseResult, CaseStore, Deduplicator, DescendantResolver, TagService};
use crate::cluster::{tag_label, Cluster, ClusterId, DisplayId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// How a tagging run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Every selected cluster was processed
    Completed,
    /// Cancellation stopped the run between clusters
    Aborted,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// What happened to one cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterOutcome {
    pub cluster_id: ClusterId,
    pub display_id: DisplayId,
    pub label: String,
    /// Items the label was applied to
    pub tagged: usize,
}

/// Result of a tagging run
#[derive(Debug, Clone, Serialize)]
pub struct TagReport {
    pub run: String,
    pub status: RunStatus,
    /// Number of clusters selected
    pub total: usize,
    /// Processed clusters, in processing order
    pub clusters: Vec<ClusterOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl TagReport {
    pub fn completed(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_aborted(&self) -> bool {
        self.status == RunStatus::Aborted
    }

    /// Sum of items tagged across processed clusters
    pub fn tagged_items(&self) -> usize {
        self.clusters.iter().map(|c| c.tagged).sum()
    }

    /// One-line human summary
    pub fn summary(&self) -> String {
        match self.status {
            RunStatus::Completed => format!(
                "Completed: tagged {} items across {} clusters of {}",
                self.tagged_items(),
                self.completed(),
                self.run
            ),
            RunStatus::Aborted => format!(
                "Aborted after {} of {} clusters of {}",
                self.completed(),
                self.total,
                self.run
            ),
        }
    }
}

/// Applies `ClusterReview|<run>|<display id>` to each cluster's review set.
pub struct ClusterTagger<'a> {
    store: &'a dyn CaseStore,
    resolver: &'a dyn DescendantResolver,
    deduplicator: &'a dyn Deduplicator,
    tags: &'a dyn TagService,
    progress: &'a dyn ProgressSink,
    cancel: CancellationToken,
}

impl<'a> ClusterTagger<'a> {
    /// Tagger over a single case session providing every collaborator
    pub fn new<C: Case>(case: &'a C) -> Self {
        Self::from_parts(case, case, case, case)
    }

    /// Tagger over separately supplied collaborators
    pub fn from_parts(
        store: &'a dyn CaseStore,
        resolver: &'a dyn DescendantResolver,
        deduplicator: &'a dyn Deduplicator,
        tags: &'a dyn TagService,
    ) -> Self {
        Self {
            store,
            resolver,
            deduplicator,
            tags,
            progress: &NoopProgress,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Tag every cluster in `clusters`, in order.
    ///
    /// An empty selection completes normally without tagging anything.
    pub fn tag_all(&self, run: &str, clusters: &[Cluster]) -> CaseResult<TagReport> {
        let started_at = Utc::now();
        let total = clusters.len();
        let partitioner = ClusterPartitioner::new(self.store, self.resolver, self.deduplicator)
            .with_progress(self.progress);

        self.progress.main_status(&format!("Tagging {}", run));
        self.progress.main_progress(0, total);

        let mut status = RunStatus::Completed;
        let mut outcomes = Vec::with_capacity(total);
        for (index, cluster) in clusters.iter().enumerate() {
            if self.cancel.is_cancelled() {
                status = RunStatus::Aborted;
                break;
            }
            self.progress.main_progress(index, total);
            outcomes.push(self.tag_cluster(&partitioner, run, cluster)?);
        }

        match status {
            RunStatus::Completed => {
                self.progress.main_progress(total, total);
                self.progress.main_status("Completed");
            }
            RunStatus::Aborted => self.progress.main_status("Aborted"),
        }

        Ok(TagReport {
            run: run.to_string(),
            status,
            total,
            clusters: outcomes,
            started_at,
            finished_at: Utc::now(),
        })
    }

    fn tag_cluster(
        &self,
        partitioner: &ClusterPartitioner<'_>,
        run: &str,
        cluster: &Cluster,
    ) -> CaseResult<ClusterOutcome> {
        let display_id = cluster.display_id();
        self.progress
            .main_status(&format!("Tagging Cluster {}-{}", run, display_id));

        let review = partitioner.review(run, cluster)?;
        let label = tag_label(run, display_id);

        self.progress
            .sub_status(&format!("Tagging {} items with: {}", review.len(), label));
        self.progress.sub_progress(0, review.len());
        if !review.is_empty() {
            self.tags.apply_tag(&label, review.items())?;
        }
        self.progress.sub_progress(review.len(), review.len());

        Ok(ClusterOutcome {
            cluster_id: cluster.id,
            display_id,
            label,
            tagged: review.len(),
        })
    }
}
