//! `scopectl`: inspect scope and permission decisions.
//!
//! Usage:
//!   scopectl [-c scope.toml] [--data-dir DIR] [--db FILE] <command>
//!
//! Reads from the JSON data dir when `--data-dir` is given (or set in the
//! config file without a `db_path`), otherwise from the redb directory.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use scope::ScopeConfig;
use tracing::info;

/// Scope inspection tool.
#[derive(Parser, Debug)]
#[command(name = "scopectl", about = "Inspect hierarchy scope and permission decisions")]
struct Cli {
    /// Path to config file.
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// JSON data directory (overrides config).
    #[arg(long = "data-dir", global = true)]
    data_dir: Option<PathBuf>,

    /// redb directory file (overrides config).
    #[arg(long = "db", global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve an actor's initial scope and print it.
    Resolve {
        /// Actor id.
        actor: String,
    },

    /// Resolve an actor's scope, apply selections top-down, print the result.
    Select {
        /// Actor id.
        actor: String,
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        area: Option<String>,
        #[arg(long)]
        church: Option<String>,
        #[arg(long)]
        group: Option<String>,
    },

    /// Check whether an actor may perform an action on a module.
    Can {
        /// Actor id.
        actor: String,
        /// Module tag (e.g. visitantes).
        module: String,
        /// Action (view, create, edit, delete).
        action: String,
    },

    /// List inconsistencies in the hierarchy data.
    Issues,

    /// Seed the redb directory from a JSON data directory.
    Import {
        /// Directory holding hierarchy.json, actors.json, permissions.json.
        source: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            ScopeConfig::load(path)?
        }
        None => ScopeConfig::default(),
    };
    if cli.data_dir.is_some() {
        config.data_dir = cli.data_dir.clone();
    }
    if cli.db.is_some() {
        config.db_path = cli.db.clone();
    }

    match cli.command {
        Commands::Resolve { actor } => commands::resolve(&config, &actor),
        Commands::Select { actor, region, area, church, group } => {
            commands::select(&config, &actor, [region, area, church, group])
        }
        Commands::Can { actor, module, action } => commands::can(&config, &actor, &module, &action),
        Commands::Issues => commands::issues(&config),
        Commands::Import { source } => commands::import(&config, &source),
    }
}
