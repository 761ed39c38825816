//! Per-cluster partitioning by endpoint status and review-set derivation
//!
//! Items for review are:
//! - members with status `endpoint`
//! - members with status `endpoint-attach`
//! - deduplicated descendants of members with status `endpoint-attach` or
//!   `thread-attach`
//!
//! The last two are only pulled in when the `endpoint-attach` bucket is
//! non-empty. A cluster with only `thread-attach` members contributes its
//! `endpoint` members and nothing else.

use super::progress::{NoopProgress, ProgressSink};
use crate::case::{CaseResult, CaseStore, Deduplicator, DescendantResolver};
use crate::cluster::endpoint_status::{ENDPOINT, ENDPOINT_ATTACH, THREAD_ATTACH};
use crate::cluster::{Cluster, ClusterKey, ItemId};
use std::collections::{HashMap, HashSet};

/// A cluster's members grouped by endpoint status.
///
/// Bucket order follows the cluster's member order. Looking up a status
/// that never occurred yields an empty slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBuckets {
    buckets: HashMap<String, Vec<ItemId>>,
    /// Members with no status recorded under the cluster's key
    unassigned: Vec<ItemId>,
}

impl StatusBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item to the bucket for `status`, creating it on first use.
    pub fn push(&mut self, status: Option<String>, item: ItemId) {
        match status {
            Some(status) => self.buckets.entry(status).or_default().push(item),
            None => self.unassigned.push(item),
        }
    }

    /// Items holding `status`, or an empty slice.
    pub fn get(&self, status: &str) -> &[ItemId] {
        self.buckets.get(status).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn unassigned(&self) -> &[ItemId] {
        &self.unassigned
    }

    /// Statuses that occurred, sorted
    pub fn statuses(&self) -> Vec<&str> {
        let mut statuses: Vec<&str> = self.buckets.keys().map(String::as_str).collect();
        statuses.sort_unstable();
        statuses
    }

    /// Total number of items across all buckets
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum::<usize>() + self.unassigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The items selected for human review from one cluster.
///
/// Direct `endpoint` and `endpoint-attach` members come first, in bucket
/// order, followed by the deduplicated descendant expansion. Only the
/// expansion is deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSet {
    items: Vec<ItemId>,
    endpoints: usize,
    endpoint_attachments: usize,
    descendants: usize,
}

impl ReviewSet {
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ItemId> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items taken from the `endpoint` bucket
    pub fn endpoints(&self) -> usize {
        self.endpoints
    }

    /// Number of items taken from the `endpoint-attach` bucket
    pub fn endpoint_attachments(&self) -> usize {
        self.endpoint_attachments
    }

    /// Number of deduplicated descendants appended
    pub fn descendants(&self) -> usize {
        self.descendants
    }
}

/// Partitions one cluster and derives its review set.
pub struct ClusterPartitioner<'a> {
    store: &'a dyn CaseStore,
    resolver: &'a dyn DescendantResolver,
    deduplicator: &'a dyn Deduplicator,
    progress: &'a dyn ProgressSink,
}

impl<'a> ClusterPartitioner<'a> {
    pub fn new(
        store: &'a dyn CaseStore,
        resolver: &'a dyn DescendantResolver,
        deduplicator: &'a dyn Deduplicator,
    ) -> Self {
        Self {
            store,
            resolver,
            deduplicator,
            progress: &NoopProgress,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    /// Group the cluster's members by their status under `<run>-<cluster id>`.
    pub fn partition_by_status(&self, run: &str, cluster: &Cluster) -> CaseResult<StatusBuckets> {
        self.progress.sub_status("Sorting by endpoint status");
        let key = ClusterKey::new(run, cluster.id);
        let total = cluster.members.len();
        self.progress.sub_progress(0, total);

        let mut buckets = StatusBuckets::new();
        for (index, item) in cluster.members.iter().enumerate() {
            let status = self.store.endpoint_status(item, &key)?;
            buckets.push(status, item.clone());
            self.progress.sub_progress(index + 1, total);
        }
        Ok(buckets)
    }

    /// Select the items for review from a partitioned cluster.
    pub fn derive_review_set(&self, buckets: &StatusBuckets) -> CaseResult<ReviewSet> {
        self.progress.sub_status("Finding items to review");

        let endpoints = self.take_status(buckets, ENDPOINT);
        let mut review = ReviewSet {
            endpoints: endpoints.len(),
            items: endpoints.to_vec(),
            ..Default::default()
        };

        let endpoint_attach = buckets.get(ENDPOINT_ATTACH);
        if !endpoint_attach.is_empty() {
            let direct = self.take_status(buckets, ENDPOINT_ATTACH);
            review.endpoint_attachments = direct.len();
            review.items.extend_from_slice(direct);

            let attachments = self.attachments(buckets)?;
            review.descendants = attachments.len();
            review.items.extend(attachments);
        }
        Ok(review)
    }

    /// Partition then derive in one step.
    pub fn review(&self, run: &str, cluster: &Cluster) -> CaseResult<ReviewSet> {
        let buckets = self.partition_by_status(run, cluster)?;
        self.derive_review_set(&buckets)
    }

    fn take_status<'b>(&self, buckets: &'b StatusBuckets, status: &str) -> &'b [ItemId] {
        let items = buckets.get(status);
        self.progress
            .log(&format!("Adding {} items with status: {}", items.len(), status));
        items
    }

    /// Deduplicated descendants of `endpoint-attach` ∪ `thread-attach`.
    fn attachments(&self, buckets: &StatusBuckets) -> CaseResult<Vec<ItemId>> {
        self.progress.sub_status("Getting attachments");
        self.progress.sub_progress(1, 5);

        let sources = union(buckets.get(ENDPOINT_ATTACH), buckets.get(THREAD_ATTACH));
        self.progress.log(&format!(
            "Finding attachments from {} items with status: {} OR {}",
            sources.len(),
            ENDPOINT_ATTACH,
            THREAD_ATTACH
        ));
        self.progress.sub_progress(2, 5);

        let descendants = self.resolver.find_descendants(&sources)?;
        self.progress.log(&format!("Found {} descendants", descendants.len()));
        self.progress.sub_progress(3, 5);

        let unique = self.deduplicator.deduplicate(&descendants)?;
        self.progress.log(&format!(
            "Adding {} deduplicated items (attachments)",
            unique.len()
        ));
        self.progress.sub_progress(4, 5);
        Ok(unique)
    }
}

/// Concatenate two item slices, dropping repeats and keeping first occurrence.
fn union(a: &[ItemId], b: &[ItemId]) -> Vec<ItemId> {
    let mut seen = HashSet::with_capacity(a.len() + b.len());
    a.iter()
        .chain(b)
        .filter(|item| seen.insert(*item))
        .cloned()
        .collect()
}
