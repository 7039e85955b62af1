use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::TagId;

/// A tag that can be attached to scenes and galleries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Assigned by the store on creation.
    pub id: Option<TagId>,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tag {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
