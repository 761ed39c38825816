//! In-memory case backend
//!
//! Holds a whole case in process memory. Deduplication collapses items that
//! share an MD5 digest; items without a digest are unique by GUID.

use super::fixture::{CaseFixture, ItemRecord, MemberRecord};
use super::traits::{
    CaseError, CaseResult, CaseStore, Deduplicator, DescendantResolver, TagService,
};
use crate::cluster::{Cluster, ClusterId, ClusterKey, ClusterRun, ItemId};
use dashmap::DashMap;
use std::collections::{BTreeSet, HashMap, HashSet};

#[derive(Debug, Default)]
pub struct MemoryCase {
    items: HashMap<ItemId, ItemRecord>,
    children: HashMap<ItemId, Vec<ItemId>>,
    /// Runs in insertion order, each with its clusters
    runs: Vec<(String, Vec<Cluster>)>,
    statuses: HashMap<(ItemId, ClusterKey), String>,
    tags: DashMap<ItemId, BTreeSet<String>>,
}

impl MemoryCase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a case from a validated fixture
    pub fn from_fixture(fixture: &CaseFixture) -> CaseResult<Self> {
        fixture.validate()?;
        let mut case = Self::new();
        for item in &fixture.items {
            case.add_item(item.clone());
        }
        for run in &fixture.cluster_runs {
            case.add_run(&run.name);
            for cluster in &run.clusters {
                case.add_cluster(&run.name, cluster.id, cluster.members.clone())?;
            }
        }
        Ok(case)
    }

    /// Insert or replace an item record
    pub fn add_item(&mut self, item: ItemRecord) {
        if let Some(old) = self.items.get(&item.guid) {
            if let Some(parent) = &old.parent {
                if let Some(siblings) = self.children.get_mut(parent) {
                    siblings.retain(|c| c != &item.guid);
                }
            }
        }
        if let Some(parent) = &item.parent {
            self.children
                .entry(parent.clone())
                .or_default()
                .push(item.guid.clone());
        }
        self.items.insert(item.guid.clone(), item);
    }

    /// Register a cluster run with no clusters. No-op if it exists.
    pub fn add_run(&mut self, name: &str) {
        if !self.runs.iter().any(|(n, _)| n == name) {
            self.runs.push((name.to_string(), Vec::new()));
        }
    }

    /// Add a cluster to a run, recording each member's endpoint status.
    ///
    /// The run is created on first use. Unknown members become bare items.
    pub fn add_cluster(
        &mut self,
        run: &str,
        id: impl Into<ClusterId>,
        members: Vec<MemberRecord>,
    ) -> CaseResult<()> {
        let id = id.into();
        self.add_run(run);
        if self
            .runs
            .iter()
            .any(|(n, clusters)| n == run && clusters.iter().any(|c| c.id == id))
        {
            return Err(CaseError::InvalidFixture(format!(
                "duplicate cluster {} in run {}",
                id, run
            )));
        }
        let key = ClusterKey::new(run, id);

        let mut member_ids = Vec::with_capacity(members.len());
        for member in members {
            if !self.items.contains_key(&member.item) {
                self.add_item(ItemRecord::new(member.item.clone()));
            }
            if let Some(status) = member.status {
                self.statuses.insert((member.item.clone(), key.clone()), status);
            }
            member_ids.push(member.item);
        }

        let clusters = self
            .runs
            .iter_mut()
            .find(|(n, _)| n == run)
            .map(|(_, c)| c)
            .ok_or_else(|| CaseError::ClusterRunNotFound(run.to_string()))?;
        clusters.push(Cluster::new(id, member_ids));
        Ok(())
    }

    /// Labels applied to an item, sorted
    pub fn tags_for(&self, item: &ItemId) -> Vec<String> {
        self.tags
            .get(item)
            .map(|t| t.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Items carrying a label, sorted by GUID
    pub fn items_tagged(&self, label: &str) -> Vec<ItemId> {
        let mut items: Vec<ItemId> = self
            .tags
            .iter()
            .filter(|entry| entry.value().contains(label))
            .map(|entry| entry.key().clone())
            .collect();
        items.sort();
        items
    }

    /// Every distinct label applied anywhere in the case, sorted
    pub fn labels(&self) -> Vec<String> {
        let labels: BTreeSet<String> = self
            .tags
            .iter()
            .flat_map(|entry| entry.value().iter().cloned().collect::<Vec<_>>())
            .collect();
        labels.into_iter().collect()
    }

    fn digest(&self, item: &ItemId) -> Option<&str> {
        self.items.get(item).and_then(|i| i.md5.as_deref())
    }
}

impl CaseStore for MemoryCase {
    fn list_cluster_runs(&self) -> CaseResult<Vec<ClusterRun>> {
        Ok(self
            .runs
            .iter()
            .map(|(name, clusters)| ClusterRun {
                name: name.clone(),
                cluster_count: clusters.len(),
            })
            .collect())
    }

    fn list_clusters(&self, run: &str) -> CaseResult<Vec<Cluster>> {
        let (_, clusters) = self
            .runs
            .iter()
            .find(|(n, _)| n == run)
            .ok_or_else(|| CaseError::ClusterRunNotFound(run.to_string()))?;
        let mut clusters = clusters.clone();
        clusters.sort_by_key(|c| c.id);
        Ok(clusters)
    }

    fn endpoint_status(&self, item: &ItemId, key: &ClusterKey) -> CaseResult<Option<String>> {
        Ok(self.statuses.get(&(item.clone(), key.clone())).cloned())
    }
}

impl DescendantResolver for MemoryCase {
    /// Depth-first over child links, excluding the inputs themselves.
    /// Each descendant appears once, in discovery order.
    fn find_descendants(&self, items: &[ItemId]) -> CaseResult<Vec<ItemId>> {
        let mut seen: HashSet<&ItemId> = HashSet::new();
        let mut found = Vec::new();
        for root in items {
            let mut stack: Vec<&ItemId> = self
                .children
                .get(root)
                .map(|c| c.iter().rev().collect())
                .unwrap_or_default();
            while let Some(item) = stack.pop() {
                if !seen.insert(item) {
                    continue;
                }
                found.push(item.clone());
                if let Some(children) = self.children.get(item) {
                    stack.extend(children.iter().rev());
                }
            }
        }
        Ok(found)
    }
}

impl Deduplicator for MemoryCase {
    fn deduplicate(&self, items: &[ItemId]) -> CaseResult<Vec<ItemId>> {
        let mut digests = HashSet::new();
        let mut guids = HashSet::new();
        let mut unique = Vec::new();
        for item in items {
            let first = match self.digest(item) {
                Some(md5) => digests.insert(md5),
                None => guids.insert(item),
            };
            if first {
                unique.push(item.clone());
            }
        }
        Ok(unique)
    }
}

impl TagService for MemoryCase {
    fn apply_tag(&self, label: &str, items: &[ItemId]) -> CaseResult<()> {
        for item in items {
            self.tags
                .entry(item.clone())
                .or_default()
                .insert(label.to_string());
        }
        Ok(())
    }
}
