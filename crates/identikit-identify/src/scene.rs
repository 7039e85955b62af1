//! Scene identification.

use std::fmt;
use std::sync::Arc;

use identikit_core::model::{Scene, SceneId};
use identikit_core::partial::{SceneUpdate, UpdateList};
use identikit_core::scraped::ScrapedScene;
use identikit_core::store::{Repository, SceneReader, TxnManager};

use crate::error::{IdentifyError, IdentifyResult};
use crate::hooks::SceneUpdatePostHookExecutor;
use crate::options::{FieldStrategies, MetadataOptions};
use crate::outcome::IdentifyOutcome;
use crate::relationships::tags::with_marker_tag;
use crate::relationships::Relationships;
use crate::scalar::scene_partial;
use crate::source::{scrape_scene, SceneScraper, ScrapeOutcome, ScraperSource};

/// Identifies scenes against an ordered list of sources.
pub struct SceneIdentifier<T> {
    pub txn: T,

    /// Options applied underneath each source's own options.
    pub default_options: Option<MetadataOptions>,
    pub sources: Vec<ScraperSource<dyn SceneScraper>>,
    pub hooks: Arc<dyn SceneUpdatePostHookExecutor>,
}

impl<T: fmt::Debug> fmt::Debug for SceneIdentifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneIdentifier")
            .field("txn", &self.txn)
            .field("default_options", &self.default_options)
            .field("sources", &self.sources)
            .finish_non_exhaustive()
    }
}

fn find_scene<S: SceneReader>(store: &S, id: SceneId) -> IdentifyResult<Scene> {
    store.find_scene(id)?.ok_or_else(|| {
        IdentifyError::Store(identikit_core::Error::NotFound {
            entity: "scene",
            id: id.to_string(),
        })
    })
}

/// Everything one run needs besides the store.
struct Reconcile<'a> {
    scraped: &'a ScrapedScene,
    endpoint: Option<&'a str>,
    options: &'a MetadataOptions,
    fields: &'a FieldStrategies,
}

/// Compute the full change set for a scene with loaded relationships.
fn scene_update<S: Repository>(
    store: &S,
    scene: &Scene,
    run: &Reconcile<'_>,
) -> IdentifyResult<SceneUpdate> {
    let rel = Relationships {
        store,
        fields: run.fields,
        endpoint: run.endpoint,
        skip_single_name_performers: run.options.skip_single_name_performers(),
    };
    let scraped = run.scraped;

    let mut partial = scene_partial(scene, scraped, run.fields, run.options.set_organized())?;
    partial.studio_id = rel.studio(scene.studio_id, scraped.studio.as_ref())?;

    let performers = rel.performers(
        scene.performer_ids.list(),
        &scraped.performers,
        !run.options.include_male_performers(),
    )?;
    partial.performer_ids = performers.ids.map(UpdateList::set);

    let mut tag_ids = rel.tags(scene.tag_ids.list(), &scraped.tags)?;
    if performers.skipped_single_name {
        if let Some(marker) = run.options.skip_single_name_performer_tag() {
            tag_ids = with_marker_tag(tag_ids, scene.tag_ids.list(), marker)?;
        }
    }
    partial.tag_ids = tag_ids.map(UpdateList::set);

    let cover_image = if run.options.set_cover_image() {
        rel.cover(scene.id, scraped.image.as_deref())?
    } else {
        None
    };

    let mut update = SceneUpdate {
        partial,
        cover_image,
    };

    // A confirmed match refreshes the cross-reference whenever anything else changes.
    let touch = !update.is_empty();
    update.partial.stash_ids = rel
        .stash_ids(
            scene.stash_ids.list(),
            scraped.remote_site_id.as_deref(),
            touch,
        )
        .map(UpdateList::set);

    Ok(update)
}

/// Reload the scene, diff it and write the result. Runs inside one transaction.
fn apply<S: Repository>(
    store: &S,
    id: SceneId,
    source_name: &str,
    run: &Reconcile<'_>,
) -> IdentifyResult<Option<SceneUpdate>> {
    let mut scene = find_scene(store, id)?;
    scene.load_relationships(store)?;

    let update = scene_update(store, &scene, run)?;
    if update.is_empty() {
        log::debug!("Nothing to set for {}", scene.path);
        return Ok(None);
    }

    store.update_scene(id, &update)?;

    let title = update
        .partial
        .title
        .as_deref()
        .map(|t| format!(" as {t}"))
        .unwrap_or_default();
    log::info!(
        "Successfully identified {}{} using {}",
        scene.path,
        title,
        source_name
    );
    Ok(Some(update))
}

impl<T: TxnManager> SceneIdentifier<T> {
    #[must_use]
    pub fn new(txn: T, hooks: Arc<dyn SceneUpdatePostHookExecutor>) -> Self {
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
    pub fn with_source(mut self, source: ScraperSource<dyn SceneScraper>) -> Self {
        self.sources.push(source);
        self
    }

    /// Scrape a scene and apply whatever the first matching source supplies.
    ///
    /// Any error rolls back every write made during the run, including newly
    /// created performers, studios and tags.
    pub async fn identify(&self, id: SceneId) -> IdentifyResult<IdentifyOutcome> {
        let path = self
            .txn
            .with_txn(|store| find_scene(store, id).map(|s| s.path))?;

        let (scraped, source) = match scrape_scene(&self.sources, id).await {
            ScrapeOutcome::Found { result, source } => (result, source),
            // Scene sources yield one result at most, so they are never ambiguous.
            ScrapeOutcome::NotFound | ScrapeOutcome::Ambiguous { .. } => {
                log::debug!("Unable to identify {path}");
                return Ok(IdentifyOutcome::NotFound);
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

        let Some(update) = applied else {
            return Ok(IdentifyOutcome::Unchanged {
                source: source.name.clone(),
            });
        };

        let changed = update.changed_fields();
        self.hooks
            .execute_scene_update_post_hooks(id, &update, &changed);

        Ok(IdentifyOutcome::Updated {
            source: source.name.clone(),
            fields: changed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::tests::RecordingHooks;
    use crate::options::{fields, FieldOptions, FieldStrategy};
    use crate::source::tests::StaticScraper;
    use chrono::{TimeZone, Utc};
    use identikit_core::model::{PerformerId, Related, StashId, Tag, TagId};
    use identikit_core::schema::Database;
    use identikit_core::scraped::{ScrapedPerformer, ScrapedStudio, ScrapedTag};
    use identikit_core::store::{StudioReaderWriter, TagFinderCreator};

    const ENDPOINT: &str = "https://stash.example/graphql";

    fn seeded(scene: &Scene) -> Database {
        let db = Database::open_in_memory().unwrap();
        db.store().insert_scene(scene).unwrap();
        db
    }

    fn identifier(
        db: Database,
        scraper: StaticScraper,
        hooks: &Arc<RecordingHooks>,
    ) -> SceneIdentifier<Database> {
        let source = ScraperSource::new("static", Arc::new(scraper) as Arc<dyn SceneScraper>)
            .with_remote_site(ENDPOINT);
        SceneIdentifier::new(db, Arc::clone(hooks) as Arc<dyn SceneUpdatePostHookExecutor>)
            .with_source(source)
    }

    fn scraped() -> ScrapedScene {
        ScrapedScene {
            title: Some("Scraped Title".to_string()),
            date: Some("2021-06-01".to_string()),
            urls: vec!["https://site.example/scene/1".to_string()],
            remote_site_id: Some("remote-1".to_string()),
            ..Default::default()
        }
    }

    fn stash_at(id: &str) -> StashId {
        StashId {
            endpoint: ENDPOINT.to_string(),
            stash_id: id.to_string(),
            updated_at: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_identify_updates_scene_and_fires_hook() {
        let db = seeded(&Scene::new(SceneId::new(1), "/videos/one.mp4"));
        let hooks = Arc::new(RecordingHooks::default());
        let identifier = identifier(db, StaticScraper::scene(scraped()), &hooks);

        let outcome = identifier.identify(SceneId::new(1)).await.unwrap();
        assert!(outcome.is_updated());

        let store = identifier.txn.store();
        let scene = store.find_scene(SceneId::new(1)).unwrap().unwrap();
        assert_eq!(scene.title, "Scraped Title");
        assert_eq!(scene.date.unwrap().to_string(), "2021-06-01");
        assert!(scene.organized);
        let stash_ids = store.get_scene_stash_ids(SceneId::new(1)).unwrap();
        assert_eq!(stash_ids.len(), 1);
        assert_eq!(stash_ids[0].stash_id, "remote-1");

        let recorded = hooks.scenes.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, SceneId::new(1));
        assert!(recorded[0].2.contains(&"title".to_string()));
        assert!(recorded[0].2.contains(&"stash_ids".to_string()));
    }

    #[tokio::test]
    async fn test_second_run_is_unchanged() {
        let db = seeded(&Scene::new(SceneId::new(1), "/videos/one.mp4"));
        let hooks = Arc::new(RecordingHooks::default());
        let identifier = identifier(db, StaticScraper::scene(scraped()), &hooks);

        assert!(identifier.identify(SceneId::new(1)).await.unwrap().is_updated());
        let outcome = identifier.identify(SceneId::new(1)).await.unwrap();
        assert_eq!(
            outcome,
            IdentifyOutcome::Unchanged {
                source: "static".to_string()
            }
        );
        assert_eq!(hooks.scenes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_not_found_leaves_scene_alone() {
        let db = seeded(&Scene::new(SceneId::new(1), "/videos/one.mp4"));
        let hooks = Arc::new(RecordingHooks::default());
        let identifier = identifier(db, StaticScraper::default(), &hooks);

        let outcome = identifier.identify(SceneId::new(1)).await.unwrap();
        assert_eq!(outcome, IdentifyOutcome::NotFound);
        assert!(hooks.scenes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_scene_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        let hooks = Arc::new(RecordingHooks::default());
        let identifier = identifier(db, StaticScraper::scene(scraped()), &hooks);

        let err = identifier.identify(SceneId::new(42)).await.unwrap_err();
        assert!(matches!(
            err,
            IdentifyError::Store(identikit_core::Error::NotFound { entity: "scene", .. })
        ));
    }

    #[tokio::test]
    async fn test_failing_source_falls_through_to_next() {
        let db = seeded(&Scene::new(SceneId::new(1), "/videos/one.mp4"));
        let hooks = Arc::new(RecordingHooks::default());
        let identifier = SceneIdentifier::new(
            db,
            Arc::clone(&hooks) as Arc<dyn SceneUpdatePostHookExecutor>,
        )
        .with_source(ScraperSource::new(
            "broken",
            Arc::new(StaticScraper::failing()) as Arc<dyn SceneScraper>,
        ))
        .with_source(ScraperSource::new(
            "working",
            Arc::new(StaticScraper::scene(scraped())) as Arc<dyn SceneScraper>,
        ));

        match identifier.identify(SceneId::new(1)).await.unwrap() {
            IdentifyOutcome::Updated { source, .. } => assert_eq!(source, "working"),
            other => panic!("expected Updated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_same_stash_id_is_no_change() {
        let mut scene = Scene::new(SceneId::new(1), "/videos/one.mp4");
        scene.organized = true;
        scene.stash_ids = Related::new(vec![stash_at("1")]);
        let db = seeded(&scene);
        let hooks = Arc::new(RecordingHooks::default());
        let scraped = ScrapedScene {
            remote_site_id: Some("1".to_string()),
            ..Default::default()
        };
        let identifier = identifier(db, StaticScraper::scene(scraped), &hooks);

        let outcome = identifier.identify(SceneId::new(1)).await.unwrap();
        assert!(matches!(outcome, IdentifyOutcome::Unchanged { .. }));
    }

    #[tokio::test]
    async fn test_changed_stash_id_is_replaced_in_place() {
        let mut scene = Scene::new(SceneId::new(1), "/videos/one.mp4");
        scene.organized = true;
        scene.stash_ids = Related::new(vec![stash_at("1")]);
        let db = seeded(&scene);
        let hooks = Arc::new(RecordingHooks::default());
        let scraped = ScrapedScene {
            remote_site_id: Some("2".to_string()),
            ..Default::default()
        };
        let identifier = identifier(db, StaticScraper::scene(scraped), &hooks);

        let outcome = identifier.identify(SceneId::new(1)).await.unwrap();
        assert!(outcome.is_updated());

        let stash_ids = identifier
            .txn
            .store()
            .get_scene_stash_ids(SceneId::new(1))
            .unwrap();
        assert_eq!(stash_ids.len(), 1);
        assert_eq!(stash_ids[0].stash_id, "2");
        assert!(stash_ids[0].updated_at > stash_at("1").updated_at);
    }

    #[tokio::test]
    async fn test_creates_missing_relationships() {
        let db = seeded(&Scene::new(SceneId::new(1), "/videos/one.mp4"));
        let hooks = Arc::new(RecordingHooks::default());
        let scraped = ScrapedScene {
            studio: Some(ScrapedStudio {
                name: "Acme".to_string(),
                remote_site_id: Some("studio-1".to_string()),
                ..Default::default()
            }),
            tags: vec![ScrapedTag {
                stored_id: None,
                name: "outdoor".to_string(),
            }],
            performers: vec![ScrapedPerformer {
                name: Some("Jane Doe".to_string()),
                gender: Some("FEMALE".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let create = MetadataOptions {
            field_options: [fields::STUDIO, fields::TAGS, fields::PERFORMERS]
                .iter()
                .map(|f| FieldOptions::new(*f, FieldStrategy::Merge).with_create_missing(true))
                .collect(),
            ..Default::default()
        };
        let identifier =
            identifier(db, StaticScraper::scene(scraped), &hooks).with_default_options(create);

        assert!(identifier.identify(SceneId::new(1)).await.unwrap().is_updated());

        let store = identifier.txn.store();
        let scene = store.find_scene(SceneId::new(1)).unwrap().unwrap();
        let studio_id = scene.studio_id.unwrap();
        assert_eq!(store.find_studio(studio_id).unwrap().unwrap().name, "Acme");
        assert_eq!(store.get_studio_stash_ids(studio_id).unwrap()[0].stash_id, "studio-1");

        let tags = store.get_scene_tag_ids(SceneId::new(1)).unwrap();
        assert_eq!(store.find_tag(tags[0]).unwrap().unwrap().name, "outdoor");

        let performers = store.get_scene_performer_ids(SceneId::new(1)).unwrap();
        assert_eq!(performers.len(), 1);
        assert_eq!(
            store.find_performer(performers[0]).unwrap().unwrap().name,
            "Jane Doe"
        );
    }

    #[tokio::test]
    async fn test_error_rolls_back_created_entities() {
        let db = seeded(&Scene::new(SceneId::new(1), "/videos/one.mp4"));
        let hooks = Arc::new(RecordingHooks::default());
        let scraped = ScrapedScene {
            title: Some("Never written".to_string()),
            tags: vec![ScrapedTag {
                stored_id: None,
                name: "created then rolled back".to_string(),
            }],
            image: Some("not base64 at all %%%".to_string()),
            ..Default::default()
        };
        let create = MetadataOptions {
            field_options: vec![
                FieldOptions::new(fields::TAGS, FieldStrategy::Merge).with_create_missing(true)
            ],
            ..Default::default()
        };
        let identifier =
            identifier(db, StaticScraper::scene(scraped), &hooks).with_default_options(create);

        let err = identifier.identify(SceneId::new(1)).await.unwrap_err();
        assert!(matches!(err, IdentifyError::ImageDecode(_)));

        let store = identifier.txn.store();
        assert_eq!(store.find_tag(TagId::new(1)).unwrap(), None);
        let scene = store.find_scene(SceneId::new(1)).unwrap().unwrap();
        assert_eq!(scene.title, "");
        assert!(hooks.scenes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_single_name_performer_gets_marker_tag() {
        let db = seeded(&Scene::new(SceneId::new(1), "/videos/one.mp4"));
        let mut marker = Tag::new("needs disambiguation");
        db.store().create_tag(&mut marker).unwrap();
        let marker_id = marker.id.unwrap();

        let hooks = Arc::new(RecordingHooks::default());
        let scraped = ScrapedScene {
            performers: vec![ScrapedPerformer {
                name: Some("Mononym".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let options = MetadataOptions {
            field_options: vec![FieldOptions::new(fields::PERFORMERS, FieldStrategy::Merge)
                .with_create_missing(true)],
            skip_single_name_performers: Some(true),
            skip_single_name_performer_tag: Some(marker_id.to_string()),
            ..Default::default()
        };
        let identifier =
            identifier(db, StaticScraper::scene(scraped), &hooks).with_default_options(options);

        identifier.identify(SceneId::new(1)).await.unwrap();

        let store = identifier.txn.store();
        let performers: Vec<PerformerId> = store.get_scene_performer_ids(SceneId::new(1)).unwrap();
        assert!(performers.is_empty());
        assert_eq!(store.get_scene_tag_ids(SceneId::new(1)).unwrap(), vec![marker_id]);
    }

    #[tokio::test]
    async fn test_cover_image_respects_option() {
        let db = seeded(&Scene::new(SceneId::new(1), "/videos/one.mp4"));
        let hooks = Arc::new(RecordingHooks::default());
        let scraped = ScrapedScene {
            image: Some("data:image/jpeg;base64,aGVsbG8=".to_string()),
            ..Default::default()
        };
        let options = MetadataOptions {
            set_cover_image: Some(false),
            set_organized: Some(false),
            ..Default::default()
        };
        let identifier =
            identifier(db, StaticScraper::scene(scraped), &hooks).with_default_options(options);

        let outcome = identifier.identify(SceneId::new(1)).await.unwrap();
        assert!(matches!(outcome, IdentifyOutcome::Unchanged { .. }));
        assert_eq!(
            identifier.txn.store().get_scene_cover(SceneId::new(1)).unwrap(),
            None
        );
    }
}
