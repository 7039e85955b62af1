use identikit_core::model::{StashId, Studio, StudioId};
use identikit_core::scraped::ScrapedStudio;
use identikit_core::store::StudioReaderWriter;

use super::{assigned_id, parse_stored_id, Relationships};
use crate::error::{IdentifyError, IdentifyResult};
use crate::options::fields;

/// Build a new studio record from a scraped reference.
pub fn scraped_to_studio(scraped: &ScrapedStudio) -> Studio {
    let checksum = format!("{:x}", md5::compute(scraped.name.as_bytes()));
    let mut studio = Studio::new(scraped.name.clone(), checksum);
    studio.url.clone_from(&scraped.url);
    studio
}

impl<R: StudioReaderWriter> Relationships<'_, R> {
    /// Resolve the scraped studio, creating it if allowed.
    ///
    /// Returns the studio ID to set, or `None` when the stored studio stays.
    pub fn studio(
        &self,
        current: Option<StudioId>,
        scraped: Option<&ScrapedStudio>,
    ) -> IdentifyResult<Option<StudioId>> {
        let Some(scraped) = scraped else {
            return Ok(None);
        };
        if !self.fields.should_set(fields::STUDIO, current.is_some()) {
            return Ok(None);
        }

        if let Some(stored) = &scraped.stored_id {
            let id: StudioId = parse_stored_id("studio", stored)?;
            return Ok((current != Some(id)).then_some(id));
        }

        if !self.fields.create_missing(fields::STUDIO) {
            return Ok(None);
        }

        let mut studio = scraped_to_studio(scraped);
        self.store
            .create_studio(&mut studio)
            .map_err(IdentifyError::create("studio"))?;
        let id = assigned_id("studio", studio.id)?;
        log::debug!("Created studio {} ({})", studio.name, id);

        if let (Some(endpoint), Some(remote_id)) = (self.endpoint, &scraped.remote_site_id) {
            self.store
                .update_studio_stash_ids(id, &[StashId::new(endpoint, remote_id.clone())])
                .map_err(IdentifyError::create("studio stash id"))?;
        }

        Ok(Some(id))
    }
}
