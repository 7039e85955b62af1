use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::StudioId;
use crate::model::stash_id::StashId;

/// A production studio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Studio {
    /// Assigned by the store on creation.
    pub id: Option<StudioId>,
    pub name: String,

    /// Derived key used to detect duplicate studio names.
    pub checksum: String,
    pub url: Option<String>,
    pub stash_ids: Vec<StashId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Studio {
    #[must_use]
    pub fn new(name: impl Into<String>, checksum: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name: name.into(),
            checksum: checksum.into(),
            url: None,
            stash_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
