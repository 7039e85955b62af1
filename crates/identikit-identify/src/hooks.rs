//! Post-update hooks, fired after an identification commits.

use identikit_core::model::{GalleryId, SceneId};
use identikit_core::partial::{GalleryPartial, SceneUpdate};

/// Notified once per committed, non-empty scene update.
pub trait SceneUpdatePostHookExecutor: Send + Sync {
    fn execute_scene_update_post_hooks(&self, id: SceneId, update: &SceneUpdate, fields: &[&str]);
}

/// Notified once per committed, non-empty gallery update.
pub trait GalleryUpdatePostHookExecutor: Send + Sync {
    fn execute_gallery_update_post_hooks(
        &self,
        id: GalleryId,
        update: &GalleryPartial,
        fields: &[&str],
    );
}

/// Logs each update instead of dispatching it anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHookExecutor;

impl SceneUpdatePostHookExecutor for LoggingHookExecutor {
    fn execute_scene_update_post_hooks(&self, id: SceneId, update: &SceneUpdate, fields: &[&str]) {
        log::info!("Scene {} updated: {}", id, fields.join(", "));
        match serde_json::to_string(update) {
            Ok(json) => log::debug!("Scene {id} update: {json}"),
            Err(e) => log::warn!("Could not serialize update for scene {id}: {e}"),
        }
    }
}

impl GalleryUpdatePostHookExecutor for LoggingHookExecutor {
    fn execute_gallery_update_post_hooks(
        &self,
        id: GalleryId,
        update: &GalleryPartial,
        fields: &[&str],
    ) {
        log::info!("Gallery {} updated: {}", id, fields.join(", "));
        match serde_json::to_string(update) {
            Ok(json) => log::debug!("Gallery {id} update: {json}"),
            Err(e) => log::warn!("Could not serialize update for gallery {id}: {e}"),
        }
    }
}
