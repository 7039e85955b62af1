//! Gallery identification.

use std::fmt;
use std::sync::Arc;

use identikit_core::model::{Gallery, GalleryId, TagId};
use identikit_core::partial::{GalleryPartial, UpdateList};
use identikit_core::scraped::ScrapedGallery;
use identikit_core::store::{GalleryReader, Repository, TxnManager};

use crate::error::{IdentifyError, IdentifyResult};
use crate::hooks::GalleryUpdatePostHookExecutor;
use crate::options::{FieldStrategies, MetadataOptions};
use crate::outcome::IdentifyOutcome;
use crate::relationships::tags::with_marker_tag;
use crate::relationships::{parse_stored_id, Relationships};
use crate::scalar::gallery_partial;
use crate::source::{scrape_gallery, GalleryScraper, ScrapeOutcome, ScraperSource};

/// Identifies galleries against an ordered list of sources.
pub struct GalleryIdentifier<T> {
    pub txn: T,

    /// Options applied underneath each source's own options.
    pub default_options: Option<MetadataOptions>,
    pub sources: Vec<ScraperSource<dyn GalleryScraper>>,
    pub hooks: Arc<dyn GalleryUpdatePostHookExecutor>,
}

impl<T: fmt::Debug> fmt::Debug for GalleryIdentifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GalleryIdentifier")
            .field("txn", &self.txn)
            .field("default_options", &self.default_options)
            .field("sources", &self.sources)
            .finish_non_exhaustive()
    }
}

fn find_gallery<S: GalleryReader>(store: &S, id: GalleryId) -> IdentifyResult<Gallery> {
    store.find_gallery(id)?.ok_or_else(|| {
        IdentifyError::Store(identikit_core::Error::NotFound {
            entity: "gallery",
            id: id.to_string(),
        })
    })
}

/// Everything one run needs besides the store.
struct Reconcile<'a> {
    scraped: &'a ScrapedGallery,
    endpoint: Option<&'a str>,
    options: &'a MetadataOptions,
    fields: &'a FieldStrategies,
}

fn gallery_update<S: Repository>(
    store: &S,
    gallery: &Gallery,
    run: &Reconcile<'_>,
) -> IdentifyResult<GalleryPartial> {
    let rel = Relationships {
        store,
        fields: run.fields,
        endpoint: run.endpoint,
        skip_single_name_performers: run.options.skip_single_name_performers(),
    };
    let scraped = run.scraped;

    let mut partial = gallery_partial(gallery, scraped, run.fields, run.options.set_organized());
    partial.studio_id = rel.studio(gallery.studio_id, scraped.studio.as_ref())?;

    let performers = rel.performers(
        gallery.performer_ids.list(),
        &scraped.performers,
        !run.options.include_male_performers(),
    )?;
    partial.performer_ids = performers.ids.map(UpdateList::set);

    let mut tag_ids = rel.tags(gallery.tag_ids.list(), &scraped.tags)?;
    if performers.skipped_single_name {
        if let Some(marker) = run.options.skip_single_name_performer_tag() {
            tag_ids = with_marker_tag(tag_ids, gallery.tag_ids.list(), marker)?;
        }
    }
    partial.tag_ids = tag_ids.map(UpdateList::set);

    Ok(partial)
}

fn apply<S: Repository>(
    store: &S,
    id: GalleryId,
    source_name: &str,
    run: &Reconcile<'_>,
) -> IdentifyResult<Option<GalleryPartial>> {
    let mut gallery = find_gallery(store, id)?;
    gallery.load_relationships(store)?;

    let partial = gallery_update(store, &gallery, run)?;
    if partial.is_empty() {
        log::debug!("Nothing to set for {}", gallery.path);
        return Ok(None);
    }

    store.update_gallery(id, &partial)?;

    let title = partial
        .title
        .as_deref()
        .map(|t| format!(" as {t}"))
        .unwrap_or_default();
    log::info!(
        "Successfully identified {}{} using {}",
        gallery.path,
        title,
        source_name
    );
    Ok(Some(partial))
}

/// Tag a gallery that was skipped for matching too many results.
///
/// Returns whether the tag was newly added.
fn add_tag_to_gallery<S: Repository>(store: &S, id: GalleryId, tag: &str) -> IdentifyResult<bool> {
    let tag_id: TagId = parse_stored_id("tag", tag)?;
    let mut gallery = find_gallery(store, id)?;
    gallery.load_tag_ids(store)?;
    if gallery.tag_ids.list().contains(&tag_id) {
        log::debug!("Gallery {} already tagged with {}", gallery.path, tag_id);
        return Ok(false);
    }

    let partial = GalleryPartial {
        tag_ids: Some(UpdateList::add(vec![tag_id])),
        ..Default::default()
    };
    store.update_gallery(id, &partial)?;

    let name = store
        .find_tag(tag_id)?
        .map_or_else(|| tag_id.to_string(), |t| t.name);
    log::info!("Added tag {} to skipped gallery {}", name, gallery.path);
    Ok(true)
}

impl<T: TxnManager> GalleryIdentifier<T> {
    #[must_use]
    pub fn new(txn: T, hooks: Arc<dyn GalleryUpdatePostHookExecutor>) -> Self {
        Self {
            txn,
            default_options: None,
            sources: Vec::new(),
            hooks,
        }
    }

    #[must_use]
    pub fn with_default_options(mut self, options: MetadataOptions) -> Self {
        self.default_options = Some(options);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: ScraperSource<dyn GalleryScraper>) -> Self {
        self.sources.push(source);
        self
    }

    /// Scrape a gallery and apply the first usable result.
    ///
    /// A source returning several results is skipped when its options say
    /// so; the gallery is then tagged with the configured multiple-match tag.
    pub async fn identify(&self, id: GalleryId) -> IdentifyResult<IdentifyOutcome> {
        let path = self
            .txn
            .with_txn(|store| find_gallery(store, id).map(|g| g.path))?;

        let (scraped, source) =
            match scrape_gallery(&self.sources, self.default_options.as_ref(), id).await {
                ScrapeOutcome::Found { result, source } => (result, source),
                ScrapeOutcome::NotFound => {
                    log::debug!("Unable to identify {path}");
                    return Ok(IdentifyOutcome::NotFound);
                }
                ScrapeOutcome::Ambiguous { source, count } => {
                    log::debug!(
                        "Skipping {path}: {} returned {count} results",
                        source.name
                    );
                    let options = MetadataOptions::merged(
                        self.default_options.as_ref(),
                        source.options.as_ref(),
                    );
                    let tag_added = match options.skip_multiple_match_tag() {
                        Some(tag) => self
                            .txn
                            .with_txn(|store| add_tag_to_gallery(store, id, tag))?,
                        None => false,
                    };
                    return Ok(IdentifyOutcome::Ambiguous {
                        source: source.name.clone(),
                        tag_added,
                    });
                }
            };

        let options =
            MetadataOptions::merged(self.default_options.as_ref(), source.options.as_ref());
        let fields =
            FieldStrategies::resolve(source.options.iter().chain(self.default_options.iter()));

        let run = Reconcile {
            scraped: &scraped,
            endpoint: source.endpoint(),
            options: &options,
            fields: &fields,
        };

        let applied = self
            .txn
            .with_txn(|store| apply(store, id, &source.name, &run))?;

        let Some(partial) = applied else {
            return Ok(IdentifyOutcome::Unchanged {
                source: source.name.clone(),
            });
        };

        let changed = partial.changed_fields();
        self.hooks
            .execute_gallery_update_post_hooks(id, &partial, &changed);

        Ok(IdentifyOutcome::Updated {
            source: source.name.clone(),
            fields: changed,
        })
    }
}
