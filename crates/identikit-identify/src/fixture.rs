//! A scrape source backed by JSON files on disk.
//!
//! Layout:
//!
//! ```text
//! <dir>/scenes/<scene id>.json       one scraped scene
//! <dir>/galleries/<gallery id>.json  a list of scraped galleries
//! ```
//!
//! A missing file means the source has no result for that entity.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use identikit_core::model::{GalleryId, SceneId};
use identikit_core::scraped::{ScrapedGallery, ScrapedScene};
use serde::de::DeserializeOwned;

use crate::error::ScrapeError;
use crate::source::{GalleryScraper, SceneScraper};

/// Serves scraped records from a fixture directory.
#[derive(Debug, Clone)]
pub struct FixtureScraper {
    dir: PathBuf,
}

impl FixtureScraper {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read<T: DeserializeOwned>(&self, kind: &str, id: i64) -> Result<Option<T>, ScrapeError> {
        let path = self.dir.join(kind).join(format!("{id}.json"));
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No fixture at {}", path.display());
                return Ok(None);
            }
            Err(source) => return Err(ScrapeError::Io { path, source }),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| ScrapeError::Parse { path, source })
    }
}

#[async_trait]
impl SceneScraper for FixtureScraper {
    async fn scrape_scene(&self, id: SceneId) -> Result<Option<ScrapedScene>, ScrapeError> {
        self.read("scenes", id.get()).await
    }
}

#[async_trait]
impl GalleryScraper for FixtureScraper {
    async fn scrape_galleries(&self, id: GalleryId) -> Result<Vec<ScrapedGallery>, ScrapeError> {
        Ok(self.read("galleries", id.get()).await?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, contents: &str) {
        let path = dir.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[tokio::test]
    async fn test_reads_scene() {
        let dir = TempDir::new().unwrap();
        write(&dir, "scenes/3.json", r#"{"title": "From disk", "tags": [{"name": "x"}]}"#);

        let scraper = FixtureScraper::new(dir.path());
        let scene = scraper.scrape_scene(SceneId::new(3)).await.unwrap().unwrap();
        assert_eq!(scene.title.as_deref(), Some("From disk"));
        assert_eq!(scene.tags[0].name, "x");
    }

    #[tokio::test]
    async fn test_missing_file_is_no_result() {
        let dir = TempDir::new().unwrap();
        let scraper = FixtureScraper::new(dir.path());
        assert!(scraper.scrape_scene(SceneId::new(1)).await.unwrap().is_none());
        assert!(scraper
            .scrape_galleries(GalleryId::new(1))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_reads_gallery_list() {
        let dir = TempDir::new().unwrap();
        write(&dir, "galleries/8.json", r#"[{"title": "a"}, {"title": "b"}]"#);

        let scraper = FixtureScraper::new(dir.path());
        let galleries = scraper.scrape_galleries(GalleryId::new(8)).await.unwrap();
        assert_eq!(galleries.len(), 2);
        assert_eq!(galleries[1].title.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_source_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, "scenes/1.json", "{not json");

        let scraper = FixtureScraper::new(dir.path());
        let err = scraper.scrape_scene(SceneId::new(1)).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Parse { .. }));
    }
}
