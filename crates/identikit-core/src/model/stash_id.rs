use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cross-reference linking a local entity to its record on an external
/// metadata source (a "stash box" endpoint).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StashId {
    /// The endpoint URL of the external source.
    pub endpoint: String,

    /// The entity's identifier at that endpoint.
    pub stash_id: String,

    /// When the cross-reference was last confirmed.
    pub updated_at: DateTime<Utc>,
}

impl StashId {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, stash_id: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            stash_id: stash_id.into(),
            updated_at: Utc::now(),
        }
    }

    /// Whether both entries point at the same external record, regardless of
    /// when they were last confirmed.
    #[must_use]
    pub fn same_reference(&self, other: &Self) -> bool {
        self.endpoint == other.endpoint && self.stash_id == other.stash_id
    }
}
