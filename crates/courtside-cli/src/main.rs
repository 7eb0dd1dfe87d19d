//! Courtside - league schedule and standings from the terminal.
//!
//! Thin command-line front end over `courtside-core`: every command reads
//! through the response cache and only reaches the feed when an entry is
//! missing, expired, or `--refresh` was given.

mod format;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use courtside_core::interceptor::{CacheStorage, HttpNetwork, Interceptor, InterceptorConfig};
use courtside_core::{CacheKey, CacheManager, Config, FeedClient, SyncOptions, SyncService};

/// Log file prefix inside the cache directory
const LOG_FILE_PREFIX: &str = "courtside.log";

/// Interceptor asset caches live in this subdirectory of the cache directory
const ASSET_CACHE_DIR: &str = "assets";

#[derive(Parser)]
#[command(name = "courtside")]
#[command(about = "League schedule and standings with an offline-friendly cache", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Conference standings
    Standings {
        /// Ignore the cached copy
        #[arg(long)]
        refresh: bool,
    },
    /// Games over the next few days
    Schedule {
        #[arg(long)]
        refresh: bool,
    },
    /// Roster and recent/upcoming games for one team
    Team {
        /// Upstream team id
        id: String,
        #[arg(long)]
        refresh: bool,
    },
    /// Drop cached standings and schedule, fetch both again and print them
    Refresh,
    /// Inspect or clear the response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Install the app shell asset cache from the configured origin,
    /// retiring caches left by other versions
    Shell,
}

#[derive(Subcommand)]
enum CacheAction {
    Status,
    /// Remove one entry, or everything when no key is given
    Clear { key: Option<String> },
}

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` controls the level (default `warn`). When a cache directory is
/// available a daily-rolling log file is written there too; keep the
/// returned guard alive so buffered lines are flushed on exit.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX));
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::load()?;
    let cache_dir = config.cache_dir().ok();

    let _log_guard = init_tracing(cache_dir.as_deref());
    info!(command = ?std::env::args().nth(1), "Courtside starting");

    let cache_dir = cache_dir.context("Could not determine cache directory")?;
    let cache = Arc::new(CacheManager::file_backed(cache_dir.clone())?);

    match cli.command {
        Commands::Cache { action } => run_cache(&cache, action),
        Commands::Shell => run_shell(&config, cache_dir.join(ASSET_CACHE_DIR)).await,
        command => {
            let feed = FeedClient::new(&config).context("Failed to build HTTP client")?;
            let service = SyncService::new(feed, cache, SyncOptions::from(&config));
            run_sync(&service, command).await;
            Ok(())
        }
    }
}

async fn run_sync(service: &SyncService<FeedClient>, command: Commands) {
    match command {
        Commands::Standings { refresh } => {
            if refresh {
                service.invalidate(&CacheKey::standings());
            }
            print!("{}", format::standings_table(&service.fetch_standings().await));
        }
        Commands::Schedule { refresh } => {
            if refresh {
                service.invalidate(&CacheKey::schedule());
            }
            print!("{}", format::schedule_table(&service.fetch_schedule().await));
        }
        Commands::Team { id, refresh } => {
            if refresh {
                service.invalidate(&CacheKey::team_details(&id));
            }
            print!("{}", format::team_detail(&service.fetch_team_details(&id).await));
        }
        Commands::Refresh => {
            let (teams, games) = service.refresh_all().await;
            print!("{}", format::standings_table(&teams));
            println!();
            print!("{}", format::schedule_table(&games));
        }
        Commands::Cache { .. } | Commands::Shell => {}
    }
}

fn run_cache(cache: &CacheManager, action: CacheAction) -> Result<()> {
    match action {
        CacheAction::Status => {
            print!("{}", format::cache_status(&cache.entries()));
        }
        CacheAction::Clear { key: Some(key) } => {
            cache.remove(&key);
            println!("Removed {}", key);
        }
        CacheAction::Clear { key: None } => {
            let removed = cache.clear()?;
            println!("Removed {} entries", removed);
        }
    }
    Ok(())
}

async fn run_shell(config: &Config, asset_dir: PathBuf) -> Result<()> {
    let network = Arc::new(HttpNetwork::from_config(config)?);
    let storage = Arc::new(CacheStorage::persistent(asset_dir)?);
    let interceptor = Interceptor::new(network, storage, InterceptorConfig::from_config(config)?);

    let cached = interceptor.install().await?;
    let retired = interceptor.activate()?;
    println!(
        "Cached {} shell assets from {} in {}",
        cached, config.app_origin, config.asset_cache_name
    );
    for name in retired {
        println!("Retired {}", name);
    }
    Ok(())
}
