use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::fixture::FixtureScraper;
use crate::options::MetadataOptions;
use crate::source::{GalleryScraper, SceneScraper, ScraperSource};

/// Configuration for identikit.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (IDKT_* prefix)
/// 3. Config file (~/.config/identikit/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite database.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/db
    /// - ENV: IDKT_DATABASE_PATH
    /// - Config: database_path = "/path/to/db"
    /// - Default: ~/.local/share/identikit/identikit.db
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,

    /// Logger settings.
    #[serde(default)]
    pub logging: twyg::Opts,

    /// Options every source falls back to.
    #[serde(default)]
    pub defaults: MetadataOptions,

    /// Scrape sources, tried in order.
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

/// One configured scrape source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,

    /// Remote endpoint recorded on stash IDs for matches from this source.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Directory holding the source's `scenes/` and `galleries/` fixtures.
    pub fixture_dir: PathBuf,

    #[serde(default)]
    pub options: Option<MetadataOptions>,
}

impl SourceConfig {
    fn source<S: ?Sized>(&self, scraper: Arc<S>) -> ScraperSource<S> {
        let mut source = ScraperSource::new(self.name.clone(), scraper);
        if let Some(endpoint) = &self.endpoint {
            source = source.with_remote_site(endpoint.clone());
        }
        if let Some(options) = &self.options {
            source = source.with_options(options.clone());
        }
        source
    }

    pub fn scene_source(&self) -> ScraperSource<dyn SceneScraper> {
        self.source(Arc::new(FixtureScraper::new(&self.fixture_dir)) as Arc<dyn SceneScraper>)
    }

    pub fn gallery_source(&self) -> ScraperSource<dyn GalleryScraper> {
        self.source(Arc::new(FixtureScraper::new(&self.fixture_dir)) as Arc<dyn GalleryScraper>)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            logging: twyg::Opts::default(),
            defaults: MetadataOptions::default(),
            sources: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/identikit/config.toml
    /// Reads environment variables with IDKT_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("idkt");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration with custom database path.
    ///
    /// This is used when the --db CLI flag is provided.
    pub fn load_with_db_path(db_path: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.database_path = db_path;
        Ok(config)
    }

    pub fn scene_sources(&self) -> Vec<ScraperSource<dyn SceneScraper>> {
        self.sources.iter().map(SourceConfig::scene_source).collect()
    }

    pub fn gallery_sources(&self) -> Vec<ScraperSource<dyn GalleryScraper>> {
        self.sources.iter().map(SourceConfig::gallery_source).collect()
    }
}

/// Returns: ~/.local/share/identikit/identikit.db (or platform equivalent)
fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("identikit")
        .join("identikit.db")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/identikit/config.toml
/// - macOS: ~/Library/Application Support/identikit/config.toml
/// - Windows: %APPDATA%\identikit\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("identikit")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Identikit Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (IDKT_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Path to the SQLite database
#
# Can also be set via:
# - CLI: identikit --db /custom/path.db identify scene 1
# - Environment: IDKT_DATABASE_PATH=/custom/path.db
#
# Default: Platform-specific data directory
#database_path = "/path/to/custom/identikit.db"

# Options applied to every source unless the source overrides them.
[defaults]
set_organized = true
set_cover_image = true
include_male_performers = true

# Field strategies: IGNORE, MERGE (fill empty fields, add to lists) or
# OVERWRITE. The first definition of a field wins, and a source's own
# field options are consulted before these.
[[defaults.field_options]]
field = "title"
strategy = "MERGE"

[[defaults.field_options]]
field = "performers"
strategy = "MERGE"
create_missing = true

[[defaults.field_options]]
field = "tags"
strategy = "MERGE"
create_missing = false

# Scrape sources, tried in order until one returns a result.
#
# Each source reads scenes/<id>.json and galleries/<id>.json from its
# fixture directory.
[[sources]]
name = "local"
endpoint = "https://stashdb.org/graphql"
fixture_dir = "/path/to/fixtures"

[sources.options]
skip_multiple_matches = true
# Stored ID of the tag applied to galleries with several matches
#skip_multiple_match_tag = "1"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}
