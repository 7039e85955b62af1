//! Scrape sources and the multi-source dispatcher.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use identikit_core::model::{GalleryId, SceneId};
use identikit_core::scraped::{ScrapedGallery, ScrapedScene};

use crate::error::ScrapeError;
use crate::options::MetadataOptions;

/// A source that returns at most one candidate per scene.
#[async_trait]
pub trait SceneScraper: Send + Sync {
    async fn scrape_scene(&self, id: SceneId) -> Result<Option<ScrapedScene>, ScrapeError>;
}

/// A source that may return several candidates per gallery.
#[async_trait]
pub trait GalleryScraper: Send + Sync {
    async fn scrape_galleries(&self, id: GalleryId) -> Result<Vec<ScrapedGallery>, ScrapeError>;
}

/// A named scraper with its own option overrides.
pub struct ScraperSource<S: ?Sized> {
    pub name: String,

    /// Endpoint recorded on stash IDs for entities matched by this source.
    pub remote_site: Option<String>,
    pub options: Option<MetadataOptions>,
    pub scraper: Arc<S>,
}

impl<S: ?Sized> ScraperSource<S> {
    pub fn new(name: impl Into<String>, scraper: Arc<S>) -> Self {
        Self {
            name: name.into(),
            remote_site: None,
            options: None,
            scraper,
        }
    }

    #[must_use]
    pub fn with_remote_site(mut self, endpoint: impl Into<String>) -> Self {
        self.remote_site = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: MetadataOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// The endpoint, if one is configured and non-empty.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        self.remote_site.as_deref().filter(|e| !e.is_empty())
    }
}

impl<S: ?Sized> fmt::Debug for ScraperSource<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScraperSource")
            .field("name", &self.name)
            .field("remote_site", &self.remote_site)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// What the dispatcher found for one entity.
pub enum ScrapeOutcome<'a, T, S: ?Sized> {
    /// No source returned a result.
    NotFound,

    /// The first usable result and the source that produced it.
    Found {
        result: T,
        source: &'a ScraperSource<S>,
    },

    /// A source returned several results and is configured to skip them.
    Ambiguous {
        source: &'a ScraperSource<S>,
        count: usize,
    },
}

impl<T: fmt::Debug, S: ?Sized> fmt::Debug for ScrapeOutcome<'_, T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("NotFound"),
            Self::Found { result, source } => f
                .debug_struct("Found")
                .field("result", result)
                .field("source", source)
                .finish(),
            Self::Ambiguous { source, count } => f
                .debug_struct("Ambiguous")
                .field("source", source)
                .field("count", count)
                .finish(),
        }
    }
}

/// Try each scene source in order until one returns a result.
pub async fn scrape_scene<'a>(
    sources: &'a [ScraperSource<dyn SceneScraper>],
    id: SceneId,
) -> ScrapeOutcome<'a, ScrapedScene, dyn SceneScraper> {
    for source in sources {
        match source.scraper.scrape_scene(id).await {
            Ok(Some(result)) => return ScrapeOutcome::Found { result, source },
            Ok(None) => {}
            Err(e) => log::error!("error scraping scene {} from {}: {}", id, source.name, e),
        }
    }
    ScrapeOutcome::NotFound
}

/// Try each gallery source in order until one returns results.
///
/// When the first source with results returns more than one and its merged
/// options ask to skip multiple matches, the outcome is `Ambiguous` and no
/// further sources are tried.
pub async fn scrape_gallery<'a>(
    sources: &'a [ScraperSource<dyn GalleryScraper>],
    defaults: Option<&MetadataOptions>,
    id: GalleryId,
) -> ScrapeOutcome<'a, ScrapedGallery, dyn GalleryScraper> {
    for source in sources {
        let results = match source.scraper.scrape_galleries(id).await {
            Ok(results) => results,
            Err(e) => {
                log::error!("error scraping gallery {} from {}: {}", id, source.name, e);
                continue;
            }
        };

        let count = results.len();
        let Some(first) = results.into_iter().next() else {
            continue;
        };

        let options = MetadataOptions::merged(defaults, source.options.as_ref());
        if count > 1 && options.skip_multiple_matches() {
            return ScrapeOutcome::Ambiguous { source, count };
        }
        return ScrapeOutcome::Found {
            result: first,
            source,
        };
    }
    ScrapeOutcome::NotFound
}
