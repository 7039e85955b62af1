//! Storage collaborator traits.
//!
//! The identification engine only talks to storage through these traits.
//! [`crate::schema::Database`] implements all of them on SQLite; tests can
//! substitute their own implementations.

use crate::error::Result;
use crate::model::{
    Gallery, GalleryId, Performer, PerformerId, Scene, SceneId, StashId, Studio, StudioId, Tag,
    TagId,
};
use crate::partial::{GalleryPartial, SceneUpdate};

/// Read access to scenes and their relationships.
pub trait SceneReader {
    fn find_scene(&self, id: SceneId) -> Result<Option<Scene>>;
    fn get_scene_urls(&self, id: SceneId) -> Result<Vec<String>>;
    fn get_scene_performer_ids(&self, id: SceneId) -> Result<Vec<PerformerId>>;
    fn get_scene_tag_ids(&self, id: SceneId) -> Result<Vec<TagId>>;
    fn get_scene_stash_ids(&self, id: SceneId) -> Result<Vec<StashId>>;

    /// The stored cover image, if any.
    fn get_scene_cover(&self, id: SceneId) -> Result<Option<Vec<u8>>>;
}

/// Write access to scenes.
pub trait SceneUpdater {
    /// Apply a partial update (and cover replacement) to a scene.
    fn update_scene(&self, id: SceneId, update: &SceneUpdate) -> Result<()>;
}

/// Read access to galleries and their relationships.
pub trait GalleryReader {
    fn find_gallery(&self, id: GalleryId) -> Result<Option<Gallery>>;
    fn get_gallery_urls(&self, id: GalleryId) -> Result<Vec<String>>;
    fn get_gallery_performer_ids(&self, id: GalleryId) -> Result<Vec<PerformerId>>;
    fn get_gallery_tag_ids(&self, id: GalleryId) -> Result<Vec<TagId>>;
}

/// Write access to galleries.
pub trait GalleryUpdater {
    fn update_gallery(&self, id: GalleryId, partial: &GalleryPartial) -> Result<()>;
}

/// Creates performers. On success the input carries its assigned ID.
pub trait PerformerCreator {
    fn create_performer(&self, performer: &mut Performer) -> Result<()>;
}

/// Creates studios and maintains their external cross-references.
pub trait StudioReaderWriter {
    fn find_studio(&self, id: StudioId) -> Result<Option<Studio>>;

    /// On success the input carries its assigned ID.
    fn create_studio(&self, studio: &mut Studio) -> Result<()>;
    fn update_studio_stash_ids(&self, id: StudioId, stash_ids: &[StashId]) -> Result<()>;
}

/// Looks up and creates tags.
pub trait TagFinderCreator {
    fn find_tag(&self, id: TagId) -> Result<Option<Tag>>;

    /// On success the input carries its assigned ID.
    fn create_tag(&self, tag: &mut Tag) -> Result<()>;
}

pub trait SceneReaderUpdater: SceneReader + SceneUpdater {}
impl<T: SceneReader + SceneUpdater> SceneReaderUpdater for T {}

pub trait GalleryReaderUpdater: GalleryReader + GalleryUpdater {}
impl<T: GalleryReader + GalleryUpdater> GalleryReaderUpdater for T {}

/// Everything an identification run may touch inside one transaction.
pub trait Repository:
    SceneReaderUpdater + GalleryReaderUpdater + PerformerCreator + StudioReaderWriter + TagFinderCreator
{
}

impl<T> Repository for T where
    T: SceneReaderUpdater
        + GalleryReaderUpdater
        + PerformerCreator
        + StudioReaderWriter
        + TagFinderCreator
{
}

/// Runs a unit of work atomically.
///
/// `with_txn` commits when `f` returns `Ok` and rolls back every write made
/// through the store when it returns `Err`.
pub trait TxnManager {
    type Store<'a>: Repository
    where
        Self: 'a;

    fn with_txn<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Self::Store<'_>) -> std::result::Result<T, E>,
        E: From<crate::Error>;
}
