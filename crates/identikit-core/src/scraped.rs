//! Candidate metadata records returned by scrapers.
//!
//! Every scalar is optional: `None` means the scraper did not supply a value,
//! which is distinct from supplying an empty string. Relationship references
//! either carry a `stored_id` (the scraper already matched a local entity) or
//! only a name and an optional remote-site ID (a candidate for creation).

use serde::{Deserialize, Serialize};

/// A scraped studio reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapedStudio {
    /// Local studio ID, as the decimal string the scraper matched.
    pub stored_id: Option<String>,
    pub name: String,
    pub url: Option<String>,

    /// The studio's ID at the scraping source.
    pub remote_site_id: Option<String>,
}

/// A scraped tag reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapedTag {
    pub stored_id: Option<String>,
    pub name: String,
}

/// A scraped performer reference, with everything the source knows about
/// the performer in case a local record has to be created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapedPerformer {
    pub stored_id: Option<String>,
    pub name: Option<String>,
    pub disambiguation: Option<String>,
    pub gender: Option<String>,
    pub birthdate: Option<String>,
    pub death_date: Option<String>,
    pub ethnicity: Option<String>,
    pub country: Option<String>,
    pub eye_color: Option<String>,
    pub hair_color: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub measurements: Option<String>,
    pub fake_tits: Option<String>,
    pub career_length: Option<String>,
    pub tattoos: Option<String>,
    pub piercings: Option<String>,

    /// Comma-separated alias list.
    pub aliases: Option<String>,
    pub urls: Vec<String>,
    pub details: Option<String>,
    pub remote_site_id: Option<String>,
}

/// A scraped scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapedScene {
    pub title: Option<String>,
    pub code: Option<String>,
    pub details: Option<String>,
    pub director: Option<String>,
    pub urls: Vec<String>,
    pub date: Option<String>,

    /// Cover image as a `data:` URI or bare base64.
    pub image: Option<String>,
    pub studio: Option<ScrapedStudio>,
    pub tags: Vec<ScrapedTag>,
    pub performers: Vec<ScrapedPerformer>,

    /// The scene's ID at the scraping source.
    pub remote_site_id: Option<String>,
}

/// A scraped gallery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapedGallery {
    pub title: Option<String>,
    pub code: Option<String>,
    pub details: Option<String>,
    pub photographer: Option<String>,
    pub urls: Vec<String>,
    pub date: Option<String>,
    pub studio: Option<ScrapedStudio>,
    pub tags: Vec<ScrapedTag>,
    pub performers: Vec<ScrapedPerformer>,
}
