use anyhow::{Context, Result};
use identikit_identify::{config, Config};
use toml_edit::DocumentMut;

/// Show the current effective configuration.
pub fn show_config(config: &Config) -> Result<()> {
    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!(
        "File exists: {}\n",
        if exists { "yes" } else { "no (using defaults)" }
    );

    println!("Settings:");
    println!("  database_path: {}", config.database_path.display());
    println!("  logging.level: {:?}", config.logging.level());
    println!("  logging.coloured: {}", config.logging.coloured());
    println!("  logging.output: {:?}", config.logging.output());

    let defaults = &config.defaults;
    println!("  defaults.set_organized: {}", defaults.set_organized());
    println!("  defaults.set_cover_image: {}", defaults.set_cover_image());
    println!(
        "  defaults.include_male_performers: {}",
        defaults.include_male_performers()
    );
    for field in &defaults.field_options {
        println!(
            "  defaults.field_options.{}: {:?} (create missing: {})",
            field.field,
            field.strategy.unwrap_or_default(),
            field.create_missing.unwrap_or(false)
        );
    }

    println!("\nSources ({}):", config.sources.len());
    for source in &config.sources {
        println!(
            "  {} -> {} [{}]",
            source.name,
            source.fixture_dir.display(),
            source.endpoint.as_deref().unwrap_or("no endpoint")
        );
    }

    println!("\nPriority: CLI args > ENV vars (IDKT_*) > Config file > Defaults");

    Ok(())
}

/// Look up a dotted key in the effective configuration.
fn lookup(config: &Config, key: &str) -> Result<String> {
    let mut value = toml::Value::try_from(config).context("Failed to serialize configuration")?;
    for part in key.split('.') {
        value = value
            .get(part)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Unknown config key: {}", key))?;
    }
    Ok(match value {
        toml::Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Get a specific config value.
pub fn get_config(key: Option<String>) -> Result<()> {
    if let Some(key) = key {
        let config = Config::load()?;
        println!("{}", lookup(&config, &key)?);
    } else {
        // No key provided, show entire config file contents
        let config_path = config::config_file_path();

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).context("Failed to read config file")?;
            print!("{}", contents);
        } else {
            println!("Config file does not exist: {}", config_path.display());
            println!("\nRun 'identikit config init' to create it.");
        }
    }

    Ok(())
}

/// Booleans and numbers keep their type; anything else is stored as a string.
fn parse_value(raw: &str) -> toml_edit::Value {
    raw.parse::<toml_edit::Value>()
        .unwrap_or_else(|_| toml_edit::Value::from(raw))
}

/// Set a dotted key in a config document, keeping comments and layout.
///
/// The result must still load as a [`Config`].
fn set_value(contents: &str, key: &str, raw: &str) -> Result<String> {
    let mut doc: DocumentMut = contents.parse().context("Failed to parse config file")?;

    let mut parts: Vec<&str> = key.split('.').collect();
    let last = parts
        .pop()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Empty config key"))?;

    let mut table = doc.as_table_mut();
    for part in parts {
        table = table
            .entry(part)
            .or_insert(toml_edit::table())
            .as_table_mut()
            .ok_or_else(|| anyhow::anyhow!("{} in {} is not a table", part, key))?;
    }
    table[last] = toml_edit::value(parse_value(raw));

    let updated = doc.to_string();
    toml::from_str::<Config>(&updated).with_context(|| format!("Invalid value for {}", key))?;
    Ok(updated)
}

/// Set a config value.
pub fn set_config(key: &str, value: &str) -> Result<()> {
    let config_path = config::config_file_path();

    // Ensure config file exists
    config::ensure_config_file()?;

    let contents = std::fs::read_to_string(&config_path).context("Failed to read config file")?;
    let updated = set_value(&contents, key, value)?;

    std::fs::write(&config_path, updated).context("Failed to write config file")?;

    println!("✓ Updated {} = {}", key, value);
    println!("  in {}", config_path.display());

    Ok(())
}

/// Show the config file path.
pub fn show_path() {
    println!("{}", config::config_file_path().display());
}

/// Show example configuration.
pub fn show_example() {
    print!("{}", config::example_config());
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure identikit.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_keeps_comments() {
        let updated = set_value(config::example_config(), "defaults.set_organized", "false").unwrap();
        assert!(updated.contains("# Identikit Configuration File"));

        let config: Config = toml::from_str(&updated).unwrap();
        assert!(!config.defaults.set_organized());
        assert_eq!(config.sources.len(), 1);
    }

    #[test]
    fn test_set_creates_missing_keys() {
        let updated = set_value("", "database_path", "/tmp/identikit.db").unwrap();
        let config: Config = toml::from_str(&updated).unwrap();
        assert_eq!(config.database_path.to_str(), Some("/tmp/identikit.db"));

        let updated = set_value(&updated, "defaults.skip_multiple_match_tag", "\"12\"").unwrap();
        let config: Config = toml::from_str(&updated).unwrap();
        assert_eq!(config.defaults.skip_multiple_match_tag(), Some("12"));
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        assert!(set_value("", "defaults.set_organized", "sometimes").is_err());
        assert!(set_value("", "", "x").is_err());
    }

    #[test]
    fn test_lookup() {
        let config: Config = toml::from_str(config::example_config()).unwrap();
        assert_eq!(lookup(&config, "defaults.set_organized").unwrap(), "true");
        assert!(lookup(&config, "defaults.nope").is_err());
    }
}
