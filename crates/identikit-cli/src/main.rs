use anyhow::Result;
use clap::Parser;
use identikit_identify::Config;
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "identikit", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the database (default: ~/.local/share/identikit/identikit.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Identify a scene or gallery against the configured sources
    ///
    /// Sources are tried in the order they appear in the config file. The
    /// first one with a result wins; its option overrides are layered over
    /// the [defaults] section. Every change for one entity, including newly
    /// created performers, studios and tags, is written in a single
    /// transaction.
    Identify {
        #[command(subcommand)]
        target: IdentifyTarget,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, clap::Subcommand)]
enum IdentifyTarget {
    /// Identify a scene
    Scene {
        /// Scene ID
        id: i64,
    },
    /// Identify a gallery
    Gallery {
        /// Gallery ID
        id: i64,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Print a config value, or the whole file when no key is given
    Get {
        /// Dotted key, e.g. defaults.set_organized
        key: Option<String>,
    },
    /// Set a config value in the config file
    Set {
        /// Dotted key, e.g. defaults.set_organized
        key: String,
        value: String,
    },
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file if it does not exist
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.db {
        Some(db) => Config::load_with_db_path(db)?,
        None => Config::load()?,
    };

    twyg::setup(config.logging.clone())
        .map_err(|e| anyhow::anyhow!("Could not set up logger: {:?}", e))?;

    match cli.command {
        Commands::Identify { target } => {
            if let Some(parent) = config.database_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            match target {
                IdentifyTarget::Scene { id } => commands::identify_scene(&config, id).await?,
                IdentifyTarget::Gallery { id } => commands::identify_gallery(&config, id).await?,
            }
        }
        Commands::Config { command } => match command {
            ConfigCommand::Show => commands::config::show_config(&config)?,
            ConfigCommand::Get { key } => commands::config::get_config(key)?,
            ConfigCommand::Set { key, value } => commands::config::set_config(&key, &value)?,
            ConfigCommand::Path => commands::config::show_path(),
            ConfigCommand::Example => commands::config::show_example(),
            ConfigCommand::Init => commands::config::init_config()?,
        },
    }

    Ok(())
}
