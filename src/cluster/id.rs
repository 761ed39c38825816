//! Cluster identity resolution
//!
//! Raw cluster IDs are integers. Two negative IDs are reserved by the
//! clustering engine for pseudo-clusters and display as names instead.

use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;

/// Raw identifier of a cluster within a cluster run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(i64);

impl ClusterId {
    /// Items the engine could not place in any real cluster
    pub const UNCLUSTERABLE: ClusterId = ClusterId(-1);
    /// Items explicitly excluded from clustering
    pub const IGNORABLE: ClusterId = ClusterId(-2);

    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> i64 {
        self.0
    }

    /// True for the reserved pseudo-cluster IDs
    pub fn is_pseudo(&self) -> bool {
        *self == Self::UNCLUSTERABLE || *self == Self::IGNORABLE
    }

    /// Resolve the display form of this ID.
    pub fn display_id(&self) -> DisplayId {
        match *self {
            Self::UNCLUSTERABLE => DisplayId::Unclusterable,
            Self::IGNORABLE => DisplayId::Ignorable,
            ClusterId(n) => DisplayId::Numbered(n),
        }
    }
}

impl std::fmt::Display for ClusterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ClusterId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<i32> for ClusterId {
    fn from(id: i32) -> Self {
        Self(i64::from(id))
    }
}

/// Display form of a cluster ID: a reserved name or the integer itself.
///
/// Serializes as a JSON string for pseudo-clusters and a number otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayId {
    Unclusterable,
    Ignorable,
    Numbered(i64),
}

impl DisplayId {
    pub fn cluster_id(&self) -> ClusterId {
        match self {
            Self::Unclusterable => ClusterId::UNCLUSTERABLE,
            Self::Ignorable => ClusterId::IGNORABLE,
            Self::Numbered(n) => ClusterId(*n),
        }
    }

    pub fn is_pseudo(&self) -> bool {
        !matches!(self, Self::Numbered(_))
    }
}

// Sorted by the underlying raw ID so display order matches cluster order.
impl Ord for DisplayId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cluster_id().cmp(&other.cluster_id())
    }
}

impl PartialOrd for DisplayId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for DisplayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unclusterable => write!(f, "unclusterable"),
            Self::Ignorable => write!(f, "ignorable"),
            Self::Numbered(n) => write!(f, "{}", n),
        }
    }
}

impl Serialize for DisplayId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Numbered(n) => serializer.serialize_i64(*n),
            _ => serializer.collect_str(self),
        }
    }
}

/// Resolve the display form of a raw cluster ID.
///
/// Total: every integer maps to a defined result.
pub fn display_id(id: ClusterId) -> DisplayId {
    id.display_id()
}
