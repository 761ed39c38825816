//! Item handles

use serde::{Deserialize, Serialize};

/// Opaque reference to a document or object in the case.
///
/// Serializes as a plain string (the case's item GUID). Equality is
/// identity of the handle; content equality belongs to the `Deduplicator`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create an ItemId from an existing GUID string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_id_serializes_as_string() {
        let id = ItemId::from_string("guid-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"guid-1\"");
    }
}
