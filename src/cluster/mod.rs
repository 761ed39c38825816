//! Cluster data model

mod id;
mod item;
mod model;

pub use id::{display_id, ClusterId, DisplayId};
pub use item::ItemId;
pub use model::{endpoint_status, tag_label, Cluster, ClusterKey, ClusterRun, TAG_PREFIX};
