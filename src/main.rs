//! # Item Store daemon (`itemd`)
//!
//! ## Usage
//!
//! ```bash
//! itemd [--config ./itemd.toml] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `itemd init` | Create the `items` table and index |
//! | `itemd serve` | Migrate, then start the HTTP API |
//! | `itemd serve --memory` | Start the HTTP API on an in-memory store |
//!
//! Every setting can also come from the environment (`PORT`, `DB_HOST`,
//! `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`, `CORS_ORIGINS`), or from a
//! `.env` file in the working directory.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use item_store::config::{self, Config};
use item_store::pg_store::PgStore;
use item_store::{db, logging, migrate, server};
use item_store_core::service::ItemService;
use item_store_core::store::memory::InMemoryStore;

/// Item store: a CRUD HTTP service over a single PostgreSQL table.
#[derive(Parser)]
#[command(name = "itemd", version, about)]
struct Cli {
    /// Path to an optional TOML configuration file.
    ///
    /// Environment variables override values from the file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema.
    ///
    /// Idempotent; running it against an initialized database is a no-op.
    Init,

    /// Start the HTTP API.
    Serve {
        /// Keep items in process memory instead of PostgreSQL.
        #[arg(long)]
        memory: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;
    logging::init(&config.logging)?;

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&config).await?;
            migrate::run_migrations(&pool).await?;
            pool.close().await;
            println!("Database initialized: {}", config.db.name);
        }
        Commands::Serve { memory } => {
            serve(&config, memory).await?;
        }
    }

    Ok(())
}

async fn serve(config: &Config, memory: bool) -> Result<()> {
    if memory {
        tracing::warn!("using in-memory store; items are lost on exit");
        let service = ItemService::new(Arc::new(InMemoryStore::new()));
        return server::run_server(config, service).await;
    }

    let pool = db::connect(config).await?;
    migrate::run_migrations(&pool).await?;

    let service = ItemService::new(Arc::new(PgStore::new(pool.clone())));
    let result = server::run_server(config, service).await;
    pool.close().await;
    result
}
