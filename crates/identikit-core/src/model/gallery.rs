use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::date::Date;
use crate::model::ids::{GalleryId, PerformerId, StudioId, TagId};
use crate::model::related::Related;
use crate::store::GalleryReader;

/// An image gallery in the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gallery {
    pub id: GalleryId,

    /// Folder or archive path, used for log messages.
    pub path: String,
    pub title: String,
    pub details: String,
    pub date: Option<Date>,
    pub photographer: String,
    pub code: String,
    pub organized: bool,
    pub studio_id: Option<StudioId>,

    // --- Relationships (loaded on demand) ---
    #[serde(skip)]
    pub urls: Related<String>,
    #[serde(skip)]
    pub performer_ids: Related<PerformerId>,
    #[serde(skip)]
    pub tag_ids: Related<TagId>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Gallery {
    #[must_use]
    pub fn new(id: GalleryId, path: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            path: path.into(),
            title: String::new(),
            details: String::new(),
            date: None,
            photographer: String::new(),
            code: String::new(),
            organized: false,
            studio_id: None,
            urls: Related::default(),
            performer_ids: Related::default(),
            tag_ids: Related::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn load_urls(&mut self, r: &impl GalleryReader) -> Result<()> {
        let id = self.id;
        self.urls.load_with(|| r.get_gallery_urls(id))
    }

    pub fn load_performer_ids(&mut self, r: &impl GalleryReader) -> Result<()> {
        let id = self.id;
        self.performer_ids
            .load_with(|| r.get_gallery_performer_ids(id))
    }

    pub fn load_tag_ids(&mut self, r: &impl GalleryReader) -> Result<()> {
        let id = self.id;
        self.tag_ids.load_with(|| r.get_gallery_tag_ids(id))
    }

    /// Load every relationship the identifier diffs against.
    pub fn load_relationships(&mut self, r: &impl GalleryReader) -> Result<()> {
        self.load_urls(r)?;
        self.load_performer_ids(r)?;
        self.load_tag_ids(r)
    }
}
