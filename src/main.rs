use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use ddragon_sync::config::{self, SyncConfig};
use ddragon_sync::logging::{self, LogFormat};
use ddragon_sync::sync::assets::DiskAssetCache;
use ddragon_sync::sync::client::StaticDataClient;
use ddragon_sync::sync::image_cache::ImageCacheManager;
use ddragon_sync::sync::notifier::BroadcastNotifier;
use ddragon_sync::sync::orchestrator::{SyncOrchestrator, SyncOutcome};
use ddragon_sync::sync::storage::{StorageGateway, Table};
use ddragon_sync::sync::store::SqliteStore;

#[derive(Parser)]
#[command(name = "ddragon-sync")]
#[command(version, about = "Mirror League of Legends static data into SQLite")]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database path, defaults to the data directory
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Sync the local mirror with the remote static data (default)
    Sync,
    /// Show the stored realm version and row counts
    Status,
    /// List stored champions
    Champions,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(&cli.log_level, cli.log_format, &config::log_path())?;

    let settings = match &cli.config {
        Some(path) => SyncConfig::from_file(path)?,
        None => SyncConfig::default(),
    }
    .with_env_overrides();
    let db_path = cli.db.clone().unwrap_or_else(config::db_path);

    match cli.command.unwrap_or(Command::Sync) {
        Command::Sync => tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(run_sync(&settings, &db_path)),
        Command::Status => show_status(&open_store(&db_path)?),
        Command::Champions => list_champions(&open_store(&db_path)?),
    }
}

fn open_store(db_path: &Path) -> anyhow::Result<SqliteStore> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }
    SqliteStore::open(db_path).with_context(|| format!("Failed to open {:?}", db_path))
}

async fn run_sync(settings: &SyncConfig, db_path: &Path) -> anyhow::Result<()> {
    if settings.api.api_key.is_empty() {
        anyhow::bail!(
            "No API key configured, set api.apiKey or {}",
            config::API_KEY_ENV
        );
    }

    let store = Arc::new(open_store(db_path)?);
    let assets = DiskAssetCache::new(
        &settings.cache.resolved_image_dir(),
        Duration::from_millis(settings.api.fetch_timeout_ms),
    );
    let orchestrator = SyncOrchestrator::new(
        Arc::new(StaticDataClient::from_config(&settings.api)),
        store,
        Arc::new(BroadcastNotifier::default()),
        ImageCacheManager::with_batch_size(Arc::new(assets), settings.cache.image_batch_size),
    )
    .with_version_timeout(Duration::from_millis(settings.sync.version_timeout_ms));

    match orchestrator.sync().await? {
        SyncOutcome::UpToDate { realm_version } => {
            println!("Already up to date at realm {}", realm_version);
        }
        SyncOutcome::Refreshed(summary) => {
            println!(
                "Synced realm {}: {} champions, {} skins",
                summary.realm_version, summary.champions, summary.skins
            );
            println!(
                "Cached {}/{} champion images, {}/{} skin images",
                summary.square_images.succeeded(),
                summary.square_images.attempted,
                summary.skin_images.succeeded(),
                summary.skin_images.attempted
            );
        }
    }
    Ok(())
}

fn show_status(store: &SqliteStore) -> anyhow::Result<()> {
    match store.realm()? {
        Some(realm) => println!("realm {} (cdn {})", realm.realm_version, realm.cdn),
        None => println!("realm: not synced"),
    }
    for table in [Table::Realm, Table::Champion, Table::ChampionSkin] {
        println!("{:<14} {}", table.as_str(), store.count(table)?);
    }
    Ok(())
}

fn list_champions(store: &SqliteStore) -> anyhow::Result<()> {
    for champion in store.champions()? {
        println!(
            "{:>4}  {:<16} {} - {}",
            champion.id, champion.key, champion.name, champion.title
        );
    }
    Ok(())
}
