mod commands;
mod output;
mod picker;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mediathek_core::{load_config_or_default, validate_config, SqliteFilmStore};

use commands::AppContext;

/// Broadcast media catalog and download automation.
#[derive(Debug, Parser)]
#[command(name = "mediathek", version, about)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Database file (overrides the configuration)
    #[arg(long, global = true)]
    dbfile: Option<PathBuf>,

    /// Non-interactive mode: selections include every match
    #[arg(long, global = true)]
    batch: bool,

    /// Log level (e.g. error, info, debug)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Refresh the catalog from the published list
    Update {
        /// Source: auto, json, a URL or a local file
        #[arg(long)]
        source: Option<String>,
    },
    /// Search and mark entries for a later download run
    Later {
        /// Search terms
        query: Vec<String>,
    },
    /// Search, mark and download immediately
    Now {
        /// Search terms
        query: Vec<String>,
    },
    /// Process pending downloads (queued, failed and stuck-active rows)
    Download,
    /// Show tracked downloads
    List {
        /// Comma-separated status filter (codes or names)
        #[arg(long)]
        status: Option<String>,
    },
    /// Remove entries from the pending list
    Edit,
    /// Search without downloading
    Search {
        /// Search terms
        query: Vec<String>,
    },
}

fn init_logging(level: Option<&str>) {
    let filter = level
        .and_then(|l| tracing_subscriber::EnvFilter::try_new(l).ok())
        .unwrap_or_else(|| {
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into())
        });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let mut config = load_config_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(dbfile) = cli.dbfile {
        config.database.path = dbfile;
    }
    validate_config(&config).context("Configuration validation failed")?;

    let store = Arc::new(
        SqliteFilmStore::new(&config.database.path).context("Failed to open film store")?,
    );
    let ctx = AppContext {
        config,
        store,
        batch: cli.batch,
    };

    match cli.command {
        Command::Update { source } => commands::update::run(&ctx, source.as_deref()).await,
        Command::Later { query } => commands::select::run_later(&ctx, &query).await,
        Command::Now { query } => commands::select::run_now(&ctx, &query).await,
        Command::Download => commands::download::run(&ctx).await,
        Command::List { status } => commands::list::run(&ctx, status.as_deref()),
        Command::Edit => commands::list::run_edit(&ctx),
        Command::Search { query } => commands::search::run(&ctx, &query),
    }
}
