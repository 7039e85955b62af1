use identikit_core::model::SceneId;
use identikit_core::store::SceneReader;

use super::Relationships;
use crate::error::IdentifyResult;
use crate::image::process_image_input;

impl<R: SceneReader> Relationships<'_, R> {
    /// Decode the scraped cover and return it if it differs from the stored one.
    pub fn cover(&self, scene: SceneId, image: Option<&str>) -> IdentifyResult<Option<Vec<u8>>> {
        let Some(image) = image else {
            return Ok(None);
        };

        let existing = self.store.get_scene_cover(scene)?;
        let data = process_image_input(image)?;
        Ok((existing.as_deref() != Some(data.as_slice())).then_some(data))
    }
}
