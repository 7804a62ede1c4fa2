//! stretto-sync: practice-log store and document mirror service
//!
//! Configuration priority: command line > environment > TOML file > defaults.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use stretto_common::config::{ConfigOverrides, ServiceConfig};
use stretto_common::db::LazyNoteStore;
use stretto_sync::notion::{DocumentApi, NotionClient};
use stretto_sync::{build_router, AppState};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "stretto-sync", version, about = "Practice-log store and document mirror service")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Note Store database URL, e.g. sqlite:///var/lib/stretto/notes.db
    #[arg(long, value_name = "URL")]
    database_url: Option<String>,

    /// Address to listen on
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServiceConfig::resolve(&ConfigOverrides {
        config_path: args.config,
        database_url: args.database_url,
        bind_addr: args.bind,
        log_level: args.log_level,
    })?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting stretto-sync v{}", env!("CARGO_PKG_VERSION"));
    info!("Note Store: {}", config.database_url);

    // Connected lazily by the first request that needs it
    let store = Arc::new(LazyNoteStore::new(config.database_url.clone()));

    let (documents, page_size): (Option<Arc<dyn DocumentApi>>, u32) = match &config.notion {
        Some(notion) => {
            let client: Arc<dyn DocumentApi> =
                Arc::new(NotionClient::new(notion).context("Failed to build Notion client")?);
            info!(
                "Document mirror enabled (database {}, page size {})",
                notion.repertoire_db_id, notion.children_page_size
            );
            (Some(client), notion.children_page_size)
        }
        None => {
            warn!("NOTION_API_KEY or REPERTOIRE_DB_ID not set; document mirror disabled");
            (None, stretto_common::config::MAX_CHILDREN_PAGE_SIZE)
        }
    };

    let state = AppState::new(store, documents).with_children_page_size(page_size);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("stretto-sync listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
