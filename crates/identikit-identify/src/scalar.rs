//! Scalar field reconciliation.

use identikit_core::model::{Date, Gallery, Scene};
use identikit_core::partial::{GalleryPartial, ScenePartial, UpdateList};
use identikit_core::scraped::{ScrapedGallery, ScrapedScene};

use crate::error::{IdentifyError, IdentifyResult};
use crate::options::{fields, FieldStrategies};
use crate::relationships::urls::reconcile_urls;

/// A scraped string if it differs from the stored one and the strategy allows it.
fn string_field(
    fields: &FieldStrategies,
    field: &str,
    current: &str,
    scraped: Option<&String>,
) -> Option<String> {
    let scraped = scraped?;
    (scraped != current && fields.should_set(field, !current.is_empty())).then(|| scraped.clone())
}

fn date_field(fields: &FieldStrategies, current: Option<Date>, scraped: Date) -> Option<Date> {
    let differs = current.map_or(true, |c| c.to_string() != scraped.to_string());
    (differs && fields.should_set(fields::DATE, current.is_some())).then_some(scraped)
}

/// Build the scalar part of a scene update.
///
/// The scene's URLs must already be loaded. A malformed scraped date fails.
pub fn scene_partial(
    scene: &Scene,
    scraped: &ScrapedScene,
    fields: &FieldStrategies,
    set_organized: bool,
) -> IdentifyResult<ScenePartial> {
    let date = match &scraped.date {
        Some(value) => {
            let parsed: Date = value.parse().map_err(|source| IdentifyError::InvalidDate {
                value: value.clone(),
                source,
            })?;
            date_field(fields, scene.date, parsed)
        }
        None => None,
    };

    Ok(ScenePartial {
        title: string_field(fields, fields::TITLE, &scene.title, scraped.title.as_ref()),
        date,
        details: string_field(fields, fields::DETAILS, &scene.details, scraped.details.as_ref()),
        urls: reconcile_urls(fields, scene.urls.list(), &scraped.urls).map(UpdateList::set),
        director: string_field(
            fields,
            fields::DIRECTOR,
            &scene.director,
            scraped.director.as_ref(),
        ),
        code: string_field(fields, fields::CODE, &scene.code, scraped.code.as_ref()),
        organized: (set_organized && !scene.organized).then_some(true),
        ..Default::default()
    })
}

/// Build the scalar part of a gallery update.
///
/// The gallery's URLs must already be loaded. A malformed scraped date is
/// skipped with a warning.
pub fn gallery_partial(
    gallery: &Gallery,
    scraped: &ScrapedGallery,
    fields: &FieldStrategies,
    set_organized: bool,
) -> GalleryPartial {
    let date = scraped.date.as_ref().and_then(|value| match value.parse::<Date>() {
        Ok(parsed) => date_field(fields, gallery.date, parsed),
        Err(e) => {
            log::warn!("Ignoring scraped date for {}: {}", gallery.path, e);
            None
        }
    });

    GalleryPartial {
        title: string_field(fields, fields::TITLE, &gallery.title, scraped.title.as_ref()),
        date,
        details: string_field(
            fields,
            fields::DETAILS,
            &gallery.details,
            scraped.details.as_ref(),
        ),
        urls: reconcile_urls(fields, gallery.urls.list(), &scraped.urls).map(UpdateList::set),
        photographer: string_field(
            fields,
            fields::PHOTOGRAPHER,
            &gallery.photographer,
            scraped.photographer.as_ref(),
        ),
        code: string_field(fields, fields::CODE, &gallery.code, scraped.code.as_ref()),
        organized: (set_organized && !gallery.organized).then_some(true),
        ..Default::default()
    }
}
