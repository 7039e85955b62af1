use std::sync::Arc;

use identikit_core::model::{Gallery, GalleryId, Related, Scene, SceneId, Tag, TagId};
use identikit_core::schema::Database;
use identikit_core::store::{GalleryReader, SceneReader, TagFinderCreator};
use identikit_identify::{
    FieldOptions, FieldStrategy, FixtureScraper, GalleryIdentifier, GalleryScraper,
    GalleryUpdatePostHookExecutor, IdentifyOutcome, LoggingHookExecutor, MetadataOptions,
    SceneIdentifier, SceneScraper, SceneUpdatePostHookExecutor, ScraperSource,
};
use tempfile::TempDir;

const ENDPOINT: &str = "https://stashdb.org/graphql";

fn write(dir: &TempDir, rel: &str, contents: &str) {
    let path = dir.path().join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

fn hooks() -> Arc<LoggingHookExecutor> {
    Arc::new(LoggingHookExecutor)
}

#[tokio::test]
async fn test_scene_identify_from_fixtures_persists_across_reopen() {
    let workdir = TempDir::new().unwrap();
    let db_path = workdir.path().join("identikit.db");
    let fixtures = TempDir::new().unwrap();
    write(
        &fixtures,
        "scenes/1.json",
        r#"{
            "title": "Sunset",
            "date": "2022-08",
            "details": "Shot on location.",
            "urls": ["https://site.example/scenes/sunset"],
            "image": "data:image/png;base64,aGVsbG8=",
            "studio": {"name": "Acme Studios", "remote_site_id": "studio-9"},
            "tags": [{"name": "outdoor"}],
            "performers": [
                {"name": "Jane Doe", "gender": "FEMALE", "aliases": "JD, Janie"},
                {"name": "John Roe", "gender": "MALE"}
            ],
            "remote_site_id": "scene-abc"
        }"#,
    );

    {
        let db = Database::open(&db_path).unwrap();
        db.store()
            .insert_scene(&Scene::new(SceneId::new(1), "/videos/sunset.mp4"))
            .unwrap();
    }

    let options = MetadataOptions {
        field_options: ["studio", "tags", "performers"]
            .iter()
            .map(|f| FieldOptions::new(*f, FieldStrategy::Merge).with_create_missing(true))
            .collect(),
        include_male_performers: Some(false),
        ..Default::default()
    };
    let source = ScraperSource::new(
        "fixtures",
        Arc::new(FixtureScraper::new(fixtures.path())) as Arc<dyn SceneScraper>,
    )
    .with_remote_site(ENDPOINT);
    let identifier = SceneIdentifier::new(
        Database::open(&db_path).unwrap(),
        hooks() as Arc<dyn SceneUpdatePostHookExecutor>,
    )
    .with_default_options(options)
    .with_source(source);

    let outcome = identifier.identify(SceneId::new(1)).await.unwrap();
    let IdentifyOutcome::Updated { source, fields } = outcome else {
        panic!("expected an update, got {outcome:?}");
    };
    assert_eq!(source, "fixtures");
    for field in ["title", "date", "details", "urls", "studio_id", "performer_ids", "tag_ids"] {
        assert!(fields.contains(&field), "missing {field} in {fields:?}");
    }
    assert!(fields.contains(&"cover_image"));
    assert!(fields.contains(&"stash_ids"));
    drop(identifier);

    let db = Database::open(&db_path).unwrap();
    let store = db.store();
    let scene = store.find_scene(SceneId::new(1)).unwrap().unwrap();
    assert_eq!(scene.title, "Sunset");
    assert_eq!(scene.date.unwrap().to_string(), "2022-08");
    assert!(scene.organized);
    assert!(scene.studio_id.is_some());
    assert_eq!(store.get_scene_cover(SceneId::new(1)).unwrap().unwrap(), b"hello");

    let performers = store.get_scene_performer_ids(SceneId::new(1)).unwrap();
    assert_eq!(performers.len(), 1);
    let jane = store.find_performer(performers[0]).unwrap().unwrap();
    assert_eq!(jane.name, "Jane Doe");
    assert!(jane.aliases.contains("JD"));
    assert!(jane.aliases.contains("Janie"));

    let stash_ids = store.get_scene_stash_ids(SceneId::new(1)).unwrap();
    assert_eq!(stash_ids.len(), 1);
    assert_eq!(stash_ids[0].endpoint, ENDPOINT);
    assert_eq!(stash_ids[0].stash_id, "scene-abc");
}

#[tokio::test]
async fn test_scene_identify_twice_is_idempotent() {
    let fixtures = TempDir::new().unwrap();
    write(
        &fixtures,
        "scenes/4.json",
        r#"{"title": "Again", "urls": ["https://a.example"], "remote_site_id": "r-4"}"#,
    );

    let db = Database::open_in_memory().unwrap();
    db.store()
        .insert_scene(&Scene::new(SceneId::new(4), "/videos/again.mp4"))
        .unwrap();
    let identifier = SceneIdentifier::new(db, hooks() as Arc<dyn SceneUpdatePostHookExecutor>)
        .with_source(
            ScraperSource::new(
                "fixtures",
                Arc::new(FixtureScraper::new(fixtures.path())) as Arc<dyn SceneScraper>,
            )
            .with_remote_site(ENDPOINT),
        );

    assert!(identifier.identify(SceneId::new(4)).await.unwrap().is_updated());
    assert_eq!(
        identifier.identify(SceneId::new(4)).await.unwrap(),
        IdentifyOutcome::Unchanged {
            source: "fixtures".to_string()
        }
    );
}

#[tokio::test]
async fn test_gallery_sources_fall_through_and_skip_ambiguity() {
    let broken = TempDir::new().unwrap();
    write(&broken, "galleries/1.json", "{ this is not json");
    write(&broken, "galleries/2.json", "[oops");

    let good = TempDir::new().unwrap();
    write(
        &good,
        "galleries/1.json",
        r#"[{"title": "Beach Day", "photographer": "Ann", "date": "not a date"}]"#,
    );
    write(
        &good,
        "galleries/2.json",
        r#"[{"title": "One"}, {"title": "Two"}]"#,
    );

    let db = Database::open_in_memory().unwrap();
    {
        let store = db.store();
        store.create_tag(&mut Tag::new("ambiguous")).unwrap();
        store
            .insert_gallery(&Gallery::new(GalleryId::new(1), "/galleries/beach"))
            .unwrap();
        let mut second = Gallery::new(GalleryId::new(2), "/galleries/many");
        second.tag_ids = Related::new(Vec::new());
        store.insert_gallery(&second).unwrap();
    }

    let source_options = MetadataOptions {
        skip_multiple_matches: Some(true),
        skip_multiple_match_tag: Some("1".to_string()),
        ..Default::default()
    };
    let identifier = GalleryIdentifier::new(db, hooks() as Arc<dyn GalleryUpdatePostHookExecutor>)
        .with_source(ScraperSource::new(
            "broken",
            Arc::new(FixtureScraper::new(broken.path())) as Arc<dyn GalleryScraper>,
        ))
        .with_source(
            ScraperSource::new(
                "good",
                Arc::new(FixtureScraper::new(good.path())) as Arc<dyn GalleryScraper>,
            )
            .with_options(source_options),
        );

    match identifier.identify(GalleryId::new(1)).await.unwrap() {
        IdentifyOutcome::Updated { source, fields } => {
            assert_eq!(source, "good");
            assert_eq!(fields, vec!["title", "photographer", "organized"]);
        }
        other => panic!("expected Updated, got {other:?}"),
    }

    let outcome = identifier.identify(GalleryId::new(2)).await.unwrap();
    assert_eq!(
        outcome,
        IdentifyOutcome::Ambiguous {
            source: "good".to_string(),
            tag_added: true,
        }
    );
    identifier.identify(GalleryId::new(2)).await.unwrap();

    let store = identifier.txn.store();
    let gallery = store.find_gallery(GalleryId::new(1)).unwrap().unwrap();
    assert_eq!(gallery.title, "Beach Day");
    assert_eq!(gallery.date, None);
    assert_eq!(
        store.get_gallery_tag_ids(GalleryId::new(2)).unwrap(),
        vec![TagId::new(1)]
    );
    assert_eq!(
        store.find_gallery(GalleryId::new(2)).unwrap().unwrap().title,
        ""
    );
}
