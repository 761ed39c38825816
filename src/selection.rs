//! Cluster selection
//!
//! A selection is a plain value: a cluster run name plus the chosen cluster
//! IDs. It is validated and resolved against the case before the tagger runs.

use crate::case::{CaseError, CaseStore, Deduplicator};
use crate::cluster::{Cluster, ClusterId, DisplayId};
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("no clusters chosen")]
    EmptyClusterSelection,

    #[error("cluster {id} not found in run {run}")]
    UnknownCluster { run: String, id: ClusterId },

    #[error(transparent)]
    Case(#[from] CaseError),
}

/// A cluster run and the clusters chosen from it, in processing order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub run: String,
    pub clusters: Vec<ClusterId>,
}

impl Selection {
    pub fn new(run: impl Into<String>, clusters: Vec<ClusterId>) -> Self {
        Self {
            run: run.into(),
            clusters,
        }
    }

    /// Every cluster of the run except the pseudo-clusters, sorted by ID
    pub fn default_for(store: &dyn CaseStore, run: &str) -> Result<Self, SelectionError> {
        let clusters = store
            .list_clusters(run)?
            .into_iter()
            .map(|c| c.id)
            .filter(|id| !id.is_pseudo())
            .collect();
        Ok(Self::new(run, clusters))
    }

    /// Every cluster of the run, pseudo-clusters included, sorted by ID
    pub fn all(store: &dyn CaseStore, run: &str) -> Result<Self, SelectionError> {
        let clusters = store.list_clusters(run)?.into_iter().map(|c| c.id).collect();
        Ok(Self::new(run, clusters))
    }

    pub fn validate(&self) -> Result<(), SelectionError> {
        if self.clusters.is_empty() {
            return Err(SelectionError::EmptyClusterSelection);
        }
        Ok(())
    }

    /// Look up the chosen clusters, keeping the chosen order.
    ///
    /// Repeated IDs are resolved once.
    pub fn resolve(&self, store: &dyn CaseStore) -> Result<Vec<Cluster>, SelectionError> {
        self.validate()?;
        let mut available = store.list_clusters(&self.run)?;
        let mut seen = HashSet::new();
        let mut chosen = Vec::with_capacity(self.clusters.len());
        for id in &self.clusters {
            if !seen.insert(*id) {
                continue;
            }
            let position = available
                .iter()
                .position(|c| c.id == *id)
                .ok_or_else(|| SelectionError::UnknownCluster {
                    run: self.run.clone(),
                    id: *id,
                })?;
            chosen.push(available.swap_remove(position));
        }
        Ok(chosen)
    }
}

/// One row of the cluster overview for a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterSummary {
    pub run: String,
    pub cluster_id: ClusterId,
    pub display_id: DisplayId,
    pub items: usize,
    pub deduplicated_items: usize,
}

/// Summarize every cluster of a run, sorted by ID
pub fn summarize(
    store: &dyn CaseStore,
    deduplicator: &dyn Deduplicator,
    run: &str,
) -> Result<Vec<ClusterSummary>, CaseError> {
    store
        .list_clusters(run)?
        .into_iter()
        .map(|cluster| -> Result<ClusterSummary, CaseError> {
            let deduplicated_items = deduplicator.deduplicate(&cluster.members)?.len();
            Ok(ClusterSummary {
                run: run.to_string(),
                cluster_id: cluster.id,
                display_id: cluster.display_id(),
                items: cluster.len(),
                deduplicated_items,
            })
        })
        .collect()
}
