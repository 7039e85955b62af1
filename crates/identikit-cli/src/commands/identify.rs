use anyhow::{Context, Result};
use identikit_core::model::{GalleryId, SceneId};
use identikit_core::schema::Database;
use identikit_identify::{
    Config, GalleryIdentifier, GalleryUpdatePostHookExecutor, IdentifyOutcome,
    LoggingHookExecutor, SceneIdentifier, SceneUpdatePostHookExecutor,
};
use std::sync::Arc;

fn open(config: &Config) -> Result<Database> {
    Database::open(&config.database_path).with_context(|| {
        format!(
            "Failed to open database {}",
            config.database_path.display()
        )
    })
}

fn report(kind: &str, id: i64, outcome: &IdentifyOutcome) {
    match outcome {
        IdentifyOutcome::NotFound => println!("No source identified {} {}", kind, id),
        IdentifyOutcome::Ambiguous { source, tag_added } => {
            println!("Skipped {} {}: {} returned multiple results", kind, id, source);
            if *tag_added {
                println!("  tagged for review");
            }
        }
        IdentifyOutcome::Unchanged { source } => {
            println!("{} {} already up to date with {}", kind, id, source);
        }
        IdentifyOutcome::Updated { source, fields } => {
            println!("✓ Updated {} {} using {}", kind, id, source);
            println!("  fields: {}", fields.join(", "));
        }
    }
}

pub async fn identify_scene(config: &Config, id: i64) -> Result<()> {
    if config.sources.is_empty() {
        anyhow::bail!("No sources configured. Run 'identikit config example' to see how to add one.");
    }
    log::info!("Identifying scene {}", id);

    let identifier = SceneIdentifier {
        txn: open(config)?,
        default_options: Some(config.defaults.clone()),
        sources: config.scene_sources(),
        hooks: Arc::new(LoggingHookExecutor) as Arc<dyn SceneUpdatePostHookExecutor>,
    };

    let outcome = identifier
        .identify(SceneId::new(id))
        .await
        .with_context(|| format!("Failed to identify scene {}", id))?;
    report("scene", id, &outcome);
    Ok(())
}

pub async fn identify_gallery(config: &Config, id: i64) -> Result<()> {
    if config.sources.is_empty() {
        anyhow::bail!("No sources configured. Run 'identikit config example' to see how to add one.");
    }
    log::info!("Identifying gallery {}", id);

    let identifier = GalleryIdentifier {
        txn: open(config)?,
        default_options: Some(config.defaults.clone()),
        sources: config.gallery_sources(),
        hooks: Arc::new(LoggingHookExecutor) as Arc<dyn GalleryUpdatePostHookExecutor>,
    };

    let outcome = identifier
        .identify(GalleryId::new(id))
        .await
        .with_context(|| format!("Failed to identify gallery {}", id))?;
    report("gallery", id, &outcome);
    Ok(())
}
