/// A schema migration.
#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

const MIGRATION_001: &str = r#"
-- Studios
CREATE TABLE IF NOT EXISTS studios (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    checksum TEXT NOT NULL UNIQUE,
    url TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS studio_stash_ids (
    studio_id INTEGER NOT NULL REFERENCES studios(id) ON DELETE CASCADE,
    endpoint TEXT NOT NULL,
    stash_id TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (studio_id, endpoint)
);

-- Tags
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Performers
CREATE TABLE IF NOT EXISTS performers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    disambiguation TEXT,
    gender TEXT,
    birthdate TEXT,
    death_date TEXT,
    ethnicity TEXT,
    country TEXT,
    eye_color TEXT,
    hair_color TEXT,
    height_cm INTEGER,
    weight_kg INTEGER,
    measurements TEXT,
    fake_tits TEXT,
    career_length TEXT,
    tattoos TEXT,
    piercings TEXT,
    aliases TEXT NOT NULL DEFAULT '[]',
    urls TEXT NOT NULL DEFAULT '[]',
    details TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_performers_name ON performers(name);

CREATE TABLE IF NOT EXISTS performer_stash_ids (
    performer_id INTEGER NOT NULL REFERENCES performers(id) ON DELETE CASCADE,
    endpoint TEXT NOT NULL,
    stash_id TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (performer_id, endpoint)
);

-- Scenes
CREATE TABLE IF NOT EXISTS scenes (
    id INTEGER PRIMARY KEY,
    path TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    details TEXT NOT NULL DEFAULT '',
    date TEXT,
    director TEXT NOT NULL DEFAULT '',
    code TEXT NOT NULL DEFAULT '',
    organized INTEGER NOT NULL DEFAULT 0,
    studio_id INTEGER REFERENCES studios(id) ON DELETE SET NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS scene_urls (
    scene_id INTEGER NOT NULL REFERENCES scenes(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    url TEXT NOT NULL,
    PRIMARY KEY (scene_id, position)
);

CREATE TABLE IF NOT EXISTS scenes_performers (
    scene_id INTEGER NOT NULL REFERENCES scenes(id) ON DELETE CASCADE,
    performer_id INTEGER NOT NULL REFERENCES performers(id) ON DELETE CASCADE,
    PRIMARY KEY (scene_id, performer_id)
);

CREATE TABLE IF NOT EXISTS scenes_tags (
    scene_id INTEGER NOT NULL REFERENCES scenes(id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (scene_id, tag_id)
);

CREATE TABLE IF NOT EXISTS scene_stash_ids (
    scene_id INTEGER NOT NULL REFERENCES scenes(id) ON DELETE CASCADE,
    endpoint TEXT NOT NULL,
    stash_id TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (scene_id, endpoint)
);

CREATE TABLE IF NOT EXISTS scene_covers (
    scene_id INTEGER PRIMARY KEY REFERENCES scenes(id) ON DELETE CASCADE,
    image BLOB NOT NULL
);

-- Galleries
CREATE TABLE IF NOT EXISTS galleries (
    id INTEGER PRIMARY KEY,
    path TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    details TEXT NOT NULL DEFAULT '',
    date TEXT,
    photographer TEXT NOT NULL DEFAULT '',
    code TEXT NOT NULL DEFAULT '',
    organized INTEGER NOT NULL DEFAULT 0,
    studio_id INTEGER REFERENCES studios(id) ON DELETE SET NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS gallery_urls (
    gallery_id INTEGER NOT NULL REFERENCES galleries(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    url TEXT NOT NULL,
    PRIMARY KEY (gallery_id, position)
);

CREATE TABLE IF NOT EXISTS galleries_performers (
    gallery_id INTEGER NOT NULL REFERENCES galleries(id) ON DELETE CASCADE,
    performer_id INTEGER NOT NULL REFERENCES performers(id) ON DELETE CASCADE,
    PRIMARY KEY (gallery_id, performer_id)
);

CREATE TABLE IF NOT EXISTS galleries_tags (
    gallery_id INTEGER NOT NULL REFERENCES galleries(id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (gallery_id, tag_id)
);
"#;

/// All migrations in order.
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: MIGRATION_001,
}];
