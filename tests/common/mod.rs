//! Common test utilities for review tagging tests

#![allow(dead_code)]

use cluster_review::{
    CaseResult, CaseStore, Cluster, ClusterKey, ClusterRun, Deduplicator, DescendantResolver,
    ItemId, MemberRecord, TagService,
};
use std::cell::RefCell;

pub fn id(name: &str) -> ItemId {
    ItemId::from_string(name)
}

pub fn ids(names: &[&str]) -> Vec<ItemId> {
    names.iter().map(|n| id(n)).collect()
}

pub fn member(item: &str, status: &str) -> MemberRecord {
    MemberRecord {
        item: id(item),
        status: Some(status.to_string()),
    }
}

pub fn bare(item: &str) -> MemberRecord {
    MemberRecord {
        item: id(item),
        status: None,
    }
}

/// One recorded call to a collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FindDescendants(Vec<ItemId>),
    Deduplicate(Vec<ItemId>),
    ApplyTag(String, Vec<ItemId>),
}

/// Wraps a case and records every descendant, dedup and tag call.
pub struct Recording<'a, C> {
    pub inner: &'a C,
    pub calls: RefCell<Vec<Call>>,
}

impl<'a, C> Recording<'a, C> {
    pub fn new(inner: &'a C) -> Self {
        Self {
            inner,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn tag_calls(&self) -> Vec<(String, Vec<ItemId>)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::ApplyTag(label, items) => Some((label.clone(), items.clone())),
                _ => None,
            })
            .collect()
    }
}

impl<C: CaseStore> CaseStore for Recording<'_, C> {
    fn list_cluster_runs(&self) -> CaseResult<Vec<ClusterRun>> {
        self.inner.list_cluster_runs()
    }

    fn list_clusters(&self, run: &str) -> CaseResult<Vec<Cluster>> {
        self.inner.list_clusters(run)
    }

    fn endpoint_status(&self, item: &ItemId, key: &ClusterKey) -> CaseResult<Option<String>> {
        self.inner.endpoint_status(item, key)
    }
}

impl<C: DescendantResolver> DescendantResolver for Recording<'_, C> {
    fn find_descendants(&self, items: &[ItemId]) -> CaseResult<Vec<ItemId>> {
        self.calls
            .borrow_mut()
            .push(Call::FindDescendants(items.to_vec()));
        self.inner.find_descendants(items)
    }
}

impl<C: Deduplicator> Deduplicator for Recording<'_, C> {
    fn deduplicate(&self, items: &[ItemId]) -> CaseResult<Vec<ItemId>> {
        self.calls.borrow_mut().push(Call::Deduplicate(items.to_vec()));
        self.inner.deduplicate(items)
    }
}

impl<C: TagService> TagService for Recording<'_, C> {
    fn apply_tag(&self, label: &str, items: &[ItemId]) -> CaseResult<()> {
        self.calls
            .borrow_mut()
            .push(Call::ApplyTag(label.to_string(), items.to_vec()));
        self.inner.apply_tag(label, items)
    }
}
