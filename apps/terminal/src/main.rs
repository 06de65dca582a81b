//! Smart Sales - interactive console point of sale.
//!
//! Collects operator input, calls the core, prints results. The interesting
//! behavior (cart math, checkout protocol, sale transaction) all lives in
//! `sales-core` and `sales-db`; this binary is plumbing.

mod app;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sales_db::{Database, DbConfig};

/// Smart Sales point of sale terminal.
#[derive(Parser)]
#[command(name = "smart-sales")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the SQLite database file
    #[arg(short, long, default_value = "./smart_sales.db")]
    db: String,

    /// Run against a throwaway in-memory database (nothing persists)
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG overrides; default keeps the menu output clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = if cli.ephemeral {
        DbConfig::in_memory()
    } else {
        DbConfig::new(&cli.db)
    };

    let db = Database::new(config).await?;

    if !db.health_check().await {
        anyhow::bail!("database connection failed - please verify the database path");
    }

    app::App::new(db).run().await
}
