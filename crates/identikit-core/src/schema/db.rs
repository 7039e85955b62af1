use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, ToSql};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{
    Date, Gallery, GalleryId, Performer, PerformerId, Related, Scene, SceneId, StashId, Studio,
    StudioId, Tag, TagId,
};
use crate::partial::{GalleryPartial, SceneUpdate};
use crate::store::{
    GalleryReader, GalleryUpdater, PerformerCreator, SceneReader, SceneUpdater,
    StudioReaderWriter, TagFinderCreator, TxnManager,
};

use super::migrations::MIGRATIONS;

/// A database connection that owns the schema and hands out [`Store`]s.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    /// A store that writes outside of any explicit transaction.
    #[must_use]
    pub const fn store(&self) -> Store<'_> {
        Store { conn: &self.conn }
    }

    fn init(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.apply_migrations()
    }

    fn apply_migrations(&self) -> Result<()> {
        // Create migrations table if it doesn't exist
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.conn.execute_batch(migration.sql)?;
                self.conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, migration.name],
                )?;
            }
        }

        Ok(())
    }
}

impl TxnManager for Database {
    type Store<'a> = Store<'a>;

    fn with_txn<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Store<'_>) -> std::result::Result<T, E>,
        E: From<Error>,
    {
        let tx = self.conn.unchecked_transaction().map_err(Error::from)?;
        let out = {
            let store = Store { conn: &tx };
            f(&store)?
        };
        tx.commit().map_err(Error::from)?;
        Ok(out)
    }
}

/// Entity CRUD over a borrowed connection or transaction.
#[derive(Debug, Clone, Copy)]
pub struct Store<'a> {
    conn: &'a Connection,
}

// ---------------------------------------------------------------------------
// Row helpers
// ---------------------------------------------------------------------------

fn parse_timestamp(s: &str, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(Into::into)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_date(s: Option<String>, idx: usize) -> rusqlite::Result<Option<Date>> {
    s.map(|s| {
        s.parse::<Date>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

fn parse_json_list<T: serde::de::DeserializeOwned>(s: &str, idx: usize) -> rusqlite::Result<T> {
    serde_json::from_str(s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Column assignments for a sparse `UPDATE`.
#[derive(Default)]
struct Assignments {
    columns: Vec<&'static str>,
    values: Vec<Box<dyn ToSql>>,
}

impl Assignments {
    fn push(&mut self, column: &'static str, value: impl ToSql + 'static) {
        self.columns.push(column);
        self.values.push(Box::new(value));
    }

    fn execute(mut self, conn: &Connection, table: &str, id: i64) -> Result<usize> {
        self.push("updated_at", Utc::now().to_rfc3339());
        let set = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{c} = ?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {table} SET {set} WHERE id = ?{}",
            self.values.len() + 1
        );
        self.values.push(Box::new(id));
        let changed = conn.execute(&sql, rusqlite::params_from_iter(self.values.iter()))?;
        Ok(changed)
    }
}

impl Store<'_> {
    fn query_ids(&self, sql: &str, owner: i64) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare(sql)?;
        let ids = stmt
            .query_map([owner], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    fn query_urls(&self, table: &str, owner_column: &str, owner: i64) -> Result<Vec<String>> {
        let sql = format!("SELECT url FROM {table} WHERE {owner_column} = ?1 ORDER BY position");
        let mut stmt = self.conn.prepare(&sql)?;
        let urls = stmt
            .query_map([owner], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(urls)
    }

    fn query_stash_ids(&self, table: &str, owner_column: &str, owner: i64) -> Result<Vec<StashId>> {
        let sql = format!(
            "SELECT endpoint, stash_id, updated_at FROM {table}
             WHERE {owner_column} = ?1 ORDER BY endpoint"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let ids = stmt
            .query_map([owner], |row| {
                let updated_at: String = row.get(2)?;
                Ok(StashId {
                    endpoint: row.get(0)?,
                    stash_id: row.get(1)?,
                    updated_at: parse_timestamp(&updated_at, 2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }

    fn replace_ids(&self, table: &str, columns: (&str, &str), owner: i64, ids: &[i64]) -> Result<()> {
        let (owner_column, value_column) = columns;
        self.conn.execute(
            &format!("DELETE FROM {table} WHERE {owner_column} = ?1"),
            [owner],
        )?;
        let mut stmt = self.conn.prepare(&format!(
            "INSERT OR IGNORE INTO {table} ({owner_column}, {value_column}) VALUES (?1, ?2)"
        ))?;
        for id in ids {
            stmt.execute([owner, *id])?;
        }
        Ok(())
    }

    fn replace_urls(&self, table: &str, owner_column: &str, owner: i64, urls: &[String]) -> Result<()> {
        self.conn.execute(
            &format!("DELETE FROM {table} WHERE {owner_column} = ?1"),
            [owner],
        )?;
        let mut stmt = self.conn.prepare(&format!(
            "INSERT INTO {table} ({owner_column}, position, url) VALUES (?1, ?2, ?3)"
        ))?;
        for (position, url) in urls.iter().enumerate() {
            stmt.execute(rusqlite::params![owner, position as i64, url])?;
        }
        Ok(())
    }

    fn replace_stash_ids(
        &self,
        table: &str,
        owner_column: &str,
        owner: i64,
        stash_ids: &[StashId],
    ) -> Result<()> {
        self.conn.execute(
            &format!("DELETE FROM {table} WHERE {owner_column} = ?1"),
            [owner],
        )?;
        let mut stmt = self.conn.prepare(&format!(
            "INSERT OR REPLACE INTO {table} ({owner_column}, endpoint, stash_id, updated_at)
             VALUES (?1, ?2, ?3, ?4)"
        ))?;
        for s in stash_ids {
            stmt.execute(rusqlite::params![
                owner,
                s.endpoint,
                s.stash_id,
                s.updated_at.to_rfc3339()
            ])?;
        }
        Ok(())
    }
}

fn raw_ids<T: Copy>(ids: &[T], get: impl Fn(T) -> i64) -> Vec<i64> {
    ids.iter().map(|id| get(*id)).collect()
}

// ---------------------------------------------------------------------------
// Scenes
// ---------------------------------------------------------------------------

impl Store<'_> {
    /// Insert a scene along with any relationships already loaded on it.
    pub fn insert_scene(&self, scene: &Scene) -> Result<()> {
        self.conn.execute(
            "INSERT INTO scenes (
                id, path, title, details, date, director, code, organized,
                studio_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rusqlite::params![
                scene.id.get(),
                scene.path,
                scene.title,
                scene.details,
                scene.date.map(|d| d.to_string()),
                scene.director,
                scene.code,
                scene.organized,
                scene.studio_id.map(StudioId::get),
                scene.created_at.to_rfc3339(),
                scene.updated_at.to_rfc3339(),
            ],
        )?;

        let id = scene.id.get();
        if scene.urls.loaded() {
            self.replace_urls("scene_urls", "scene_id", id, scene.urls.list())?;
        }
        if scene.performer_ids.loaded() {
            let ids = raw_ids(scene.performer_ids.list(), PerformerId::get);
            self.replace_ids("scenes_performers", ("scene_id", "performer_id"), id, &ids)?;
        }
        if scene.tag_ids.loaded() {
            let ids = raw_ids(scene.tag_ids.list(), TagId::get);
            self.replace_ids("scenes_tags", ("scene_id", "tag_id"), id, &ids)?;
        }
        if scene.stash_ids.loaded() {
            self.replace_stash_ids("scene_stash_ids", "scene_id", id, scene.stash_ids.list())?;
        }
        Ok(())
    }

    /// Store a cover image for a scene, replacing any existing one.
    pub fn set_scene_cover(&self, id: SceneId, image: &[u8]) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO scene_covers (scene_id, image) VALUES (?1, ?2)",
            rusqlite::params![id.get(), image],
        )?;
        Ok(())
    }
}

impl SceneReader for Store<'_> {
    fn find_scene(&self, id: SceneId) -> Result<Option<Scene>> {
        let scene = self
            .conn
            .query_row(
                "SELECT id, path, title, details, date, director, code, organized,
                        studio_id, created_at, updated_at
                 FROM scenes WHERE id = ?1",
                [id.get()],
                |row| {
                    let created_at: String = row.get(9)?;
                    let updated_at: String = row.get(10)?;
                    Ok(Scene {
                        id: SceneId::new(row.get(0)?),
                        path: row.get(1)?,
                        title: row.get(2)?,
                        details: row.get(3)?,
                        date: parse_date(row.get(4)?, 4)?,
                        director: row.get(5)?,
                        code: row.get(6)?,
                        organized: row.get(7)?,
                        studio_id: row.get::<_, Option<i64>>(8)?.map(StudioId::new),
                        urls: Related::default(),
                        performer_ids: Related::default(),
                        tag_ids: Related::default(),
                        stash_ids: Related::default(),
                        created_at: parse_timestamp(&created_at, 9)?,
                        updated_at: parse_timestamp(&updated_at, 10)?,
                    })
                },
            )
            .optional()?;
        Ok(scene)
    }

    fn get_scene_urls(&self, id: SceneId) -> Result<Vec<String>> {
        self.query_urls("scene_urls", "scene_id", id.get())
    }

    fn get_scene_performer_ids(&self, id: SceneId) -> Result<Vec<PerformerId>> {
        let ids = self.query_ids(
            "SELECT performer_id FROM scenes_performers WHERE scene_id = ?1 ORDER BY performer_id",
            id.get(),
        )?;
        Ok(ids.into_iter().map(PerformerId::new).collect())
    }

    fn get_scene_tag_ids(&self, id: SceneId) -> Result<Vec<TagId>> {
        let ids = self.query_ids(
            "SELECT tag_id FROM scenes_tags WHERE scene_id = ?1 ORDER BY tag_id",
            id.get(),
        )?;
        Ok(ids.into_iter().map(TagId::new).collect())
    }

    fn get_scene_stash_ids(&self, id: SceneId) -> Result<Vec<StashId>> {
        self.query_stash_ids("scene_stash_ids", "scene_id", id.get())
    }

    fn get_scene_cover(&self, id: SceneId) -> Result<Option<Vec<u8>>> {
        let cover = self
            .conn
            .query_row(
                "SELECT image FROM scene_covers WHERE scene_id = ?1",
                [id.get()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(cover)
    }
}

impl SceneUpdater for Store<'_> {
    fn update_scene(&self, id: SceneId, update: &SceneUpdate) -> Result<()> {
        let p = &update.partial;
        let mut set = Assignments::default();
        if let Some(title) = &p.title {
            set.push("title", title.clone());
        }
        if let Some(details) = &p.details {
            set.push("details", details.clone());
        }
        if let Some(date) = p.date {
            set.push("date", date.to_string());
        }
        if let Some(director) = &p.director {
            set.push("director", director.clone());
        }
        if let Some(code) = &p.code {
            set.push("code", code.clone());
        }
        if let Some(organized) = p.organized {
            set.push("organized", organized);
        }
        if let Some(studio_id) = p.studio_id {
            set.push("studio_id", studio_id.get());
        }
        if set.execute(self.conn, "scenes", id.get())? == 0 {
            return Err(Error::NotFound {
                entity: "scene",
                id: id.to_string(),
            });
        }

        let raw = id.get();
        if let Some(urls) = &p.urls {
            let current = self.get_scene_urls(id)?;
            self.replace_urls("scene_urls", "scene_id", raw, &urls.apply_to(&current))?;
        }
        if let Some(performers) = &p.performer_ids {
            let current = self.get_scene_performer_ids(id)?;
            let ids = raw_ids(&performers.apply_to(&current), PerformerId::get);
            self.replace_ids("scenes_performers", ("scene_id", "performer_id"), raw, &ids)?;
        }
        if let Some(tags) = &p.tag_ids {
            let current = self.get_scene_tag_ids(id)?;
            let ids = raw_ids(&tags.apply_to(&current), TagId::get);
            self.replace_ids("scenes_tags", ("scene_id", "tag_id"), raw, &ids)?;
        }
        if let Some(stash_ids) = &p.stash_ids {
            let current = self.get_scene_stash_ids(id)?;
            let next = stash_ids.apply_to(&current);
            self.replace_stash_ids("scene_stash_ids", "scene_id", raw, &next)?;
        }
        if let Some(cover) = &update.cover_image {
            self.set_scene_cover(id, cover)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Galleries
// ---------------------------------------------------------------------------

impl Store<'_> {
    /// Insert a gallery along with any relationships already loaded on it.
    pub fn insert_gallery(&self, gallery: &Gallery) -> Result<()> {
        self.conn.execute(
            "INSERT INTO galleries (
                id, path, title, details, date, photographer, code, organized,
                studio_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rusqlite::params![
                gallery.id.get(),
                gallery.path,
                gallery.title,
                gallery.details,
                gallery.date.map(|d| d.to_string()),
                gallery.photographer,
                gallery.code,
                gallery.organized,
                gallery.studio_id.map(StudioId::get),
                gallery.created_at.to_rfc3339(),
                gallery.updated_at.to_rfc3339(),
            ],
        )?;

        let id = gallery.id.get();
        if gallery.urls.loaded() {
            self.replace_urls("gallery_urls", "gallery_id", id, gallery.urls.list())?;
        }
        if gallery.performer_ids.loaded() {
            let ids = raw_ids(gallery.performer_ids.list(), PerformerId::get);
            self.replace_ids("galleries_performers", ("gallery_id", "performer_id"), id, &ids)?;
        }
        if gallery.tag_ids.loaded() {
            let ids = raw_ids(gallery.tag_ids.list(), TagId::get);
            self.replace_ids("galleries_tags", ("gallery_id", "tag_id"), id, &ids)?;
        }
        Ok(())
    }
}

impl GalleryReader for Store<'_> {
    fn find_gallery(&self, id: GalleryId) -> Result<Option<Gallery>> {
        let gallery = self
            .conn
            .query_row(
                "SELECT id, path, title, details, date, photographer, code, organized,
                        studio_id, created_at, updated_at
                 FROM galleries WHERE id = ?1",
                [id.get()],
                |row| {
                    let created_at: String = row.get(9)?;
                    let updated_at: String = row.get(10)?;
                    Ok(Gallery {
                        id: GalleryId::new(row.get(0)?),
                        path: row.get(1)?,
                        title: row.get(2)?,
                        details: row.get(3)?,
                        date: parse_date(row.get(4)?, 4)?,
                        photographer: row.get(5)?,
                        code: row.get(6)?,
                        organized: row.get(7)?,
                        studio_id: row.get::<_, Option<i64>>(8)?.map(StudioId::new),
                        urls: Related::default(),
                        performer_ids: Related::default(),
                        tag_ids: Related::default(),
                        created_at: parse_timestamp(&created_at, 9)?,
                        updated_at: parse_timestamp(&updated_at, 10)?,
                    })
                },
            )
            .optional()?;
        Ok(gallery)
    }

    fn get_gallery_urls(&self, id: GalleryId) -> Result<Vec<String>> {
        self.query_urls("gallery_urls", "gallery_id", id.get())
    }

    fn get_gallery_performer_ids(&self, id: GalleryId) -> Result<Vec<PerformerId>> {
        let ids = self.query_ids(
            "SELECT performer_id FROM galleries_performers WHERE gallery_id = ?1
             ORDER BY performer_id",
            id.get(),
        )?;
        Ok(ids.into_iter().map(PerformerId::new).collect())
    }

    fn get_gallery_tag_ids(&self, id: GalleryId) -> Result<Vec<TagId>> {
        let ids = self.query_ids(
            "SELECT tag_id FROM galleries_tags WHERE gallery_id = ?1 ORDER BY tag_id",
            id.get(),
        )?;
        Ok(ids.into_iter().map(TagId::new).collect())
    }
}

impl GalleryUpdater for Store<'_> {
    fn update_gallery(&self, id: GalleryId, p: &GalleryPartial) -> Result<()> {
        let mut set = Assignments::default();
        if let Some(title) = &p.title {
            set.push("title", title.clone());
        }
        if let Some(details) = &p.details {
            set.push("details", details.clone());
        }
        if let Some(date) = p.date {
            set.push("date", date.to_string());
        }
        if let Some(photographer) = &p.photographer {
            set.push("photographer", photographer.clone());
        }
        if let Some(code) = &p.code {
            set.push("code", code.clone());
        }
        if let Some(organized) = p.organized {
            set.push("organized", organized);
        }
        if let Some(studio_id) = p.studio_id {
            set.push("studio_id", studio_id.get());
        }
        if set.execute(self.conn, "galleries", id.get())? == 0 {
            return Err(Error::NotFound {
                entity: "gallery",
                id: id.to_string(),
            });
        }

        let raw = id.get();
        if let Some(urls) = &p.urls {
            let current = self.get_gallery_urls(id)?;
            self.replace_urls("gallery_urls", "gallery_id", raw, &urls.apply_to(&current))?;
        }
        if let Some(performers) = &p.performer_ids {
            let current = self.get_gallery_performer_ids(id)?;
            let ids = raw_ids(&performers.apply_to(&current), PerformerId::get);
            self.replace_ids("galleries_performers", ("gallery_id", "performer_id"), raw, &ids)?;
        }
        if let Some(tags) = &p.tag_ids {
            let current = self.get_gallery_tag_ids(id)?;
            let ids = raw_ids(&tags.apply_to(&current), TagId::get);
            self.replace_ids("galleries_tags", ("gallery_id", "tag_id"), raw, &ids)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Performers, studios, tags
// ---------------------------------------------------------------------------

impl Store<'_> {
    /// Fetch a performer by ID.
    pub fn find_performer(&self, id: PerformerId) -> Result<Option<Performer>> {
        let performer = self
            .conn
            .query_row(
                "SELECT id, name, disambiguation, gender, birthdate, death_date, ethnicity,
                        country, eye_color, hair_color, height_cm, weight_kg, measurements,
                        fake_tits, career_length, tattoos, piercings, aliases, urls, details,
                        created_at, updated_at
                 FROM performers WHERE id = ?1",
                [id.get()],
                |row| {
                    let gender: Option<String> = row.get(3)?;
                    let aliases: String = row.get(17)?;
                    let urls: String = row.get(18)?;
                    let created_at: String = row.get(20)?;
                    let updated_at: String = row.get(21)?;
                    Ok(Performer {
                        id: Some(PerformerId::new(row.get(0)?)),
                        name: row.get(1)?,
                        disambiguation: row.get(2)?,
                        gender: gender.and_then(|g| g.parse().ok()),
                        birthdate: parse_date(row.get(4)?, 4)?,
                        death_date: parse_date(row.get(5)?, 5)?,
                        ethnicity: row.get(6)?,
                        country: row.get(7)?,
                        eye_color: row.get(8)?,
                        hair_color: row.get(9)?,
                        height_cm: row.get(10)?,
                        weight_kg: row.get(11)?,
                        measurements: row.get(12)?,
                        fake_tits: row.get(13)?,
                        career_length: row.get(14)?,
                        tattoos: row.get(15)?,
                        piercings: row.get(16)?,
                        aliases: parse_json_list(&aliases, 17)?,
                        urls: parse_json_list(&urls, 18)?,
                        details: row.get(19)?,
                        stash_ids: Vec::new(),
                        created_at: parse_timestamp(&created_at, 20)?,
                        updated_at: parse_timestamp(&updated_at, 21)?,
                    })
                },
            )
            .optional()?;

        match performer {
            Some(mut p) => {
                p.stash_ids = self.query_stash_ids("performer_stash_ids", "performer_id", id.get())?;
                Ok(Some(p))
            }
            None => Ok(None),
        }
    }

    /// External cross-references recorded for a studio.
    pub fn get_studio_stash_ids(&self, id: StudioId) -> Result<Vec<StashId>> {
        self.query_stash_ids("studio_stash_ids", "studio_id", id.get())
    }
}

impl PerformerCreator for Store<'_> {
    fn create_performer(&self, p: &mut Performer) -> Result<()> {
        self.conn.execute(
            "INSERT INTO performers (
                name, disambiguation, gender, birthdate, death_date, ethnicity, country,
                eye_color, hair_color, height_cm, weight_kg, measurements, fake_tits,
                career_length, tattoos, piercings, aliases, urls, details,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                      ?17, ?18, ?19, ?20, ?21)",
            rusqlite::params![
                p.name,
                p.disambiguation,
                p.gender.map(|g| g.as_str()),
                p.birthdate.map(|d| d.to_string()),
                p.death_date.map(|d| d.to_string()),
                p.ethnicity,
                p.country,
                p.eye_color,
                p.hair_color,
                p.height_cm,
                p.weight_kg,
                p.measurements,
                p.fake_tits,
                p.career_length,
                p.tattoos,
                p.piercings,
                serde_json::to_string(&p.aliases)?,
                serde_json::to_string(&p.urls)?,
                p.details,
                p.created_at.to_rfc3339(),
                p.updated_at.to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.replace_stash_ids("performer_stash_ids", "performer_id", id, &p.stash_ids)?;
        p.id = Some(PerformerId::new(id));
        Ok(())
    }
}

impl StudioReaderWriter for Store<'_> {
    fn find_studio(&self, id: StudioId) -> Result<Option<Studio>> {
        let studio = self
            .conn
            .query_row(
                "SELECT id, name, checksum, url, created_at, updated_at
                 FROM studios WHERE id = ?1",
                [id.get()],
                |row| {
                    let created_at: String = row.get(4)?;
                    let updated_at: String = row.get(5)?;
                    Ok(Studio {
                        id: Some(StudioId::new(row.get(0)?)),
                        name: row.get(1)?,
                        checksum: row.get(2)?,
                        url: row.get(3)?,
                        stash_ids: Vec::new(),
                        created_at: parse_timestamp(&created_at, 4)?,
                        updated_at: parse_timestamp(&updated_at, 5)?,
                    })
                },
            )
            .optional()?;

        match studio {
            Some(mut s) => {
                s.stash_ids = self.get_studio_stash_ids(id)?;
                Ok(Some(s))
            }
            None => Ok(None),
        }
    }

    fn create_studio(&self, studio: &mut Studio) -> Result<()> {
        self.conn.execute(
            "INSERT INTO studios (name, checksum, url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                studio.name,
                studio.checksum,
                studio.url,
                studio.created_at.to_rfc3339(),
                studio.updated_at.to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.replace_stash_ids("studio_stash_ids", "studio_id", id, &studio.stash_ids)?;
        studio.id = Some(StudioId::new(id));
        Ok(())
    }

    fn update_studio_stash_ids(&self, id: StudioId, stash_ids: &[StashId]) -> Result<()> {
        self.replace_stash_ids("studio_stash_ids", "studio_id", id.get(), stash_ids)
    }
}

impl TagFinderCreator for Store<'_> {
    fn find_tag(&self, id: TagId) -> Result<Option<Tag>> {
        let tag = self
            .conn
            .query_row(
                "SELECT id, name, created_at, updated_at FROM tags WHERE id = ?1",
                [id.get()],
                |row| {
                    let created_at: String = row.get(2)?;
                    let updated_at: String = row.get(3)?;
                    Ok(Tag {
                        id: Some(TagId::new(row.get(0)?)),
                        name: row.get(1)?,
                        created_at: parse_timestamp(&created_at, 2)?,
                        updated_at: parse_timestamp(&updated_at, 3)?,
                    })
                },
            )
            .optional()?;
        Ok(tag)
    }

    fn create_tag(&self, tag: &mut Tag) -> Result<()> {
        self.conn.execute(
            "INSERT INTO tags (name, created_at, updated_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![tag.name, tag.created_at.to_rfc3339(), tag.updated_at.to_rfc3339()],
        )?;
        tag.id = Some(TagId::new(self.conn.last_insert_rowid()));
        Ok(())
    }
}
