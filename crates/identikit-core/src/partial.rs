//! Sparse change-sets applied to scenes and galleries.
//!
//! Every field is `None` when unchanged. A partial with every field `None`
//! is empty and must never be written.

use serde::{Deserialize, Serialize};

use crate::model::{Date, PerformerId, StashId, StudioId, TagId};

/// How a relationship update combines with the stored list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipUpdateMode {
    /// Replace the stored list entirely.
    Set,
    /// Add the values not already present.
    Add,
    /// Remove the listed values.
    Remove,
}

/// An update to a multi-valued relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateList<T> {
    pub values: Vec<T>,
    pub mode: RelationshipUpdateMode,
}

impl<T> UpdateList<T> {
    #[must_use]
    pub fn set(values: Vec<T>) -> Self {
        Self {
            values,
            mode: RelationshipUpdateMode::Set,
        }
    }

    #[must_use]
    pub fn add(values: Vec<T>) -> Self {
        Self {
            values,
            mode: RelationshipUpdateMode::Add,
        }
    }
}

impl<T: PartialEq + Clone> UpdateList<T> {
    /// Apply this update to an existing list, keeping the existing order.
    #[must_use]
    pub fn apply_to(&self, existing: &[T]) -> Vec<T> {
        match self.mode {
            RelationshipUpdateMode::Set => self.values.clone(),
            RelationshipUpdateMode::Add => {
                let mut out = existing.to_vec();
                for v in &self.values {
                    if !out.contains(v) {
                        out.push(v.clone());
                    }
                }
                out
            }
            RelationshipUpdateMode::Remove => existing
                .iter()
                .filter(|v| !self.values.contains(v))
                .cloned()
                .collect(),
        }
    }
}

/// Scalar and relationship changes for a scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenePartial {
    pub title: Option<String>,
    pub details: Option<String>,
    pub date: Option<Date>,
    pub director: Option<String>,
    pub code: Option<String>,
    pub organized: Option<bool>,
    pub urls: Option<UpdateList<String>>,
    pub studio_id: Option<StudioId>,
    pub performer_ids: Option<UpdateList<PerformerId>>,
    pub tag_ids: Option<UpdateList<TagId>>,
    pub stash_ids: Option<UpdateList<StashId>>,
}

impl ScenePartial {
    /// Names of the fields this partial changes.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        let mut push = |set: bool, name: &'static str| {
            if set {
                fields.push(name);
            }
        };
        push(self.title.is_some(), "title");
        push(self.details.is_some(), "details");
        push(self.date.is_some(), "date");
        push(self.director.is_some(), "director");
        push(self.code.is_some(), "code");
        push(self.organized.is_some(), "organized");
        push(self.urls.is_some(), "urls");
        push(self.studio_id.is_some(), "studio_id");
        push(self.performer_ids.is_some(), "performer_ids");
        push(self.tag_ids.is_some(), "tag_ids");
        push(self.stash_ids.is_some(), "stash_ids");
        fields
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }
}

/// Everything an identification run writes to a scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneUpdate {
    pub partial: ScenePartial,

    /// Replacement cover image bytes.
    #[serde(skip)]
    pub cover_image: Option<Vec<u8>>,
}

impl SceneUpdate {
    #[must_use]
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = self.partial.changed_fields();
        if self.cover_image.is_some() {
            fields.push("cover_image");
        }
        fields
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.partial.is_empty() && self.cover_image.is_none()
    }
}

/// Scalar and relationship changes for a gallery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryPartial {
    pub title: Option<String>,
    pub details: Option<String>,
    pub date: Option<Date>,
    pub photographer: Option<String>,
    pub code: Option<String>,
    pub organized: Option<bool>,
    pub urls: Option<UpdateList<String>>,
    pub studio_id: Option<StudioId>,
    pub performer_ids: Option<UpdateList<PerformerId>>,
    pub tag_ids: Option<UpdateList<TagId>>,
}

impl GalleryPartial {
    #[must_use]
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        let mut push = |set: bool, name: &'static str| {
            if set {
                fields.push(name);
            }
        };
        push(self.title.is_some(), "title");
        push(self.details.is_some(), "details");
        push(self.date.is_some(), "date");
        push(self.photographer.is_some(), "photographer");
        push(self.code.is_some(), "code");
        push(self.organized.is_some(), "organized");
        push(self.urls.is_some(), "urls");
        push(self.studio_id.is_some(), "studio_id");
        push(self.performer_ids.is_some(), "performer_ids");
        push(self.tag_ids.is_some(), "tag_ids");
        fields
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }
}
