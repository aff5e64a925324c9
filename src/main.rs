//! Pocket Indexer
//!
//! Walks block heights in order, indexing apps and accounts at each height
//! into PostgreSQL.

use anyhow::{anyhow, Result};
use clap::Parser;
use pocket_indexer::{
    EntityKind, IndexOutcome, Indexer, IndexerConfig, PocketProvider, PostgresDriver,
};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pocket-indexer")]
#[command(about = "Height-by-height Pocket chain indexer")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "indexer.toml")]
    config: String,

    /// Override log level
    #[arg(long)]
    log_level: Option<String>,

    /// Override the first height to index
    #[arg(long)]
    start_height: Option<u64>,

    /// Override the last height to index
    #[arg(long)]
    end_height: Option<u64>,

    /// Dry run mode (validate config and exit)
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_exists = std::path::Path::new(&cli.config).exists();
    let mut config = if config_exists {
        IndexerConfig::from_file(&cli.config)?
    } else {
        IndexerConfig::default()
    };

    if let Some(log_level) = cli.log_level {
        config.monitoring.log_level = log_level;
    }
    if let Some(start) = cli.start_height {
        config.indexer.start_height = start;
        config.indexer.resume = false;
    }
    if cli.end_height.is_some() {
        config.indexer.end_height = cli.end_height;
    }

    init_logging(&config);

    if !config_exists {
        warn!("Config file not found, using defaults: {}", cli.config);
    }

    info!("Starting Pocket Indexer");
    info!("RPC endpoint: {}", config.rpc.endpoint);

    config.validate()?;
    info!("Configuration validated successfully");

    if cli.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        return Ok(());
    }

    let storage = Arc::new(PostgresDriver::connect(&config.database).await?);
    storage.health_check().await?;
    let provider = Arc::new(PocketProvider::new(&config.rpc)?);
    let indexer = Indexer::new(provider, storage);

    let mut height = if config.indexer.resume {
        indexer.resume_height(config.indexer.start_height).await?
    } else {
        config.indexer.start_height
    };
    info!("Indexing from height {}", height);

    loop {
        if matches!(config.indexer.end_height, Some(end) if height > end) {
            info!("Reached end height, stopping");
            break;
        }

        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
            result = index_height(&indexer, height) => {
                if let Err(e) = result {
                    error!("Indexing stopped at height {}", height);
                    return Err(e);
                }
            }
        }

        height += 1;
    }

    info!("Shutting down Pocket Indexer");
    Ok(())
}

/// Index apps then accounts, skipping kinds a previous run already stored.
/// An empty snapshot advances; anything else stops.
async fn index_height(
    indexer: &Indexer<PocketProvider, PostgresDriver>,
    height: u64,
) -> Result<()> {
    for kind in [EntityKind::Apps, EntityKind::Accounts] {
        if indexer.is_indexed(kind, height).await? {
            info!("{} already indexed at height {}, skipping", kind, height);
            continue;
        }
        check(kind, indexer.index_block(kind, height).await)?;
    }
    Ok(())
}

fn check(kind: EntityKind, outcome: IndexOutcome) -> Result<()> {
    match outcome.result {
        Ok(()) => Ok(()),
        Err(e) if e.is_nothing_to_index() => {
            info!("{}", e);
            Ok(())
        }
        Err(e) => Err(anyhow!(
            "indexing {} failed with {} addresses attempted: {}",
            kind,
            outcome.addresses.len(),
            e
        )),
    }
}

fn init_logging(config: &IndexerConfig) {
    let log_level = config
        .monitoring
        .log_level
        .parse()
        .unwrap_or(tracing::Level::INFO);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("pocket_indexer={},sqlx=warn", log_level).into());

    if config.monitoring.structured_logging {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
