//! tunevault-catalog - Music catalog service
//!
//! Serves recording search, genre charts, and recording details assembled
//! from the catalog database and a content-addressed blob store.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tunevault_catalog::content::{ContentStore, DirectoryStore, FetchPolicy, IpfsClient};
use tunevault_catalog::db::SqliteCatalog;
use tunevault_catalog::{build_router, AppState};
use tunevault_common::config::{
    ensure_root_folder, resolve_root_folder, ContentBackend, CONFIG_FILE_NAME, ROOT_FOLDER_ENV,
};
use tunevault_common::db::init_database;
use tunevault_common::TomlConfig;

#[derive(Debug, Parser)]
#[command(name = "tunevault-catalog", version, about = "TuneVault music catalog service")]
struct Args {
    /// Root folder holding the database, blobs, and config
    #[arg(long)]
    root_folder: Option<PathBuf>,

    /// Config file (default: <root>/tunevault.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bind address, overrides the config file
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), ROOT_FOLDER_ENV);
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| root_folder.join(CONFIG_FILE_NAME));

    // Config supplies the default log level, so it loads before tracing init
    let loaded = TomlConfig::load(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    let config_found = loaded.is_some();
    let config = loaded.unwrap_or_default();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!(
        "Starting TuneVault Catalog (tunevault-catalog) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    ensure_root_folder(&root_folder).context("Failed to create root folder")?;
    info!("Root folder: {}", root_folder.display());
    if config_found {
        info!("Config: {}", config_path.display());
    } else {
        tracing::warn!("No config at {}, using defaults", config_path.display());
    }

    let db_path = config.database_path(&root_folder);
    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!("✓ Connected to database {}", db_path.display());

    let catalog = SqliteCatalog::new(pool, config.relational.query_timeout());

    let content: Arc<dyn ContentStore> = match config.content_store.backend {
        ContentBackend::Ipfs => {
            info!("Content store: IPFS node at {}", config.content_store.ipfs_api_url);
            Arc::new(
                IpfsClient::new(config.content_store.ipfs_api_url.clone())
                    .context("Failed to build IPFS client")?,
            )
        }
        ContentBackend::Directory => {
            let blob_dir = config.blob_dir(&root_folder);
            info!("Content store: blob directory {}", blob_dir.display());
            Arc::new(DirectoryStore::new(blob_dir))
        }
    };

    let fetch_policy = FetchPolicy {
        timeout: config.content_store.fetch_timeout(),
        attempts: config.content_store.fetch_attempts,
        initial_backoff: config.content_store.fetch_backoff(),
    };

    let state = AppState::new(Arc::new(catalog), content, fetch_policy);
    let app = build_router(state);

    let bind_address = args.bind.unwrap_or(config.bind_address);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("tunevault-catalog listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
