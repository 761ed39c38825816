//! YAML case fixtures
//!
//! A fixture describes a case's items and cluster runs in one document:
//!
//! ```yaml
//! items:
//!   - guid: e2
//!     md5: 5d41402abc4b2a76b9719d911017c592
//!   - guid: a1
//!     parent: e2
//! cluster_runs:
//!   - name: RunA
//!     clusters:
//!       - id: 5
//!         members:
//!           - item: e2
//!             status: endpoint-attach
//! ```
//!
//! Members not listed under `items` are created as bare items.

use super::traits::{CaseError, CaseResult};
use crate::cluster::{ClusterId, ItemId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// An item with its digest and parent link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub guid: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Content digest used for deduplication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ItemId>,
}

impl ItemRecord {
    pub fn new(guid: impl Into<ItemId>) -> Self {
        Self {
            guid: guid.into(),
            name: None,
            md5: None,
            parent: None,
        }
    }

    pub fn with_md5(mut self, md5: impl Into<String>) -> Self {
        self.md5 = Some(md5.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<ItemId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A cluster member and its endpoint status in that cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub item: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub id: ClusterId,
    #[serde(default)]
    pub members: Vec<MemberRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub name: String,
    #[serde(default)]
    pub clusters: Vec<ClusterRecord>,
}

/// A whole case described as data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseFixture {
    #[serde(default)]
    pub items: Vec<ItemRecord>,
    #[serde(default)]
    pub cluster_runs: Vec<RunRecord>,
}

impl CaseFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a fixture from YAML text
    pub fn from_yaml_str(yaml: &str) -> CaseResult<Self> {
        let fixture: CaseFixture = serde_yaml::from_str(yaml)?;
        fixture.validate()?;
        Ok(fixture)
    }

    /// Read, parse and validate a fixture file
    pub fn from_path(path: impl AsRef<Path>) -> CaseResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml_string(&self) -> CaseResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn with_item(mut self, item: ItemRecord) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_run(mut self, run: RunRecord) -> Self {
        self.cluster_runs.push(run);
        self
    }

    /// Reject duplicate item GUIDs, run names, cluster IDs within a run,
    /// and members repeated within a cluster.
    pub fn validate(&self) -> CaseResult<()> {
        let mut guids = HashSet::new();
        for item in &self.items {
            if !guids.insert(&item.guid) {
                return Err(CaseError::InvalidFixture(format!(
                    "duplicate item guid {}",
                    item.guid
                )));
            }
        }

        let mut runs = HashSet::new();
        for run in &self.cluster_runs {
            if !runs.insert(run.name.as_str()) {
                return Err(CaseError::InvalidFixture(format!(
                    "duplicate cluster run {}",
                    run.name
                )));
            }
            let mut ids = HashSet::new();
            for cluster in &run.clusters {
                if !ids.insert(cluster.id) {
                    return Err(CaseError::InvalidFixture(format!(
                        "duplicate cluster {} in run {}",
                        cluster.id, run.name
                    )));
                }
                let mut members = HashSet::new();
                for member in &cluster.members {
                    if !members.insert(&member.item) {
                        return Err(CaseError::InvalidFixture(format!(
                            "item {} listed twice in cluster {}-{}",
                            member.item, run.name, cluster.id
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
