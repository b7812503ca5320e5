//! CLI administration tool for url-forge.
//!
//! Talks to the mapping store directly, without going through the HTTP API.
//! All writes go through the same allocator the server uses, so codes issued
//! here obey the same collision and validation rules.
//!
//! # Usage
//!
//! ```bash
//! # Check database connection
//! cargo run --bin admin -- db check
//!
//! # Create the url_mappings schema (safe to repeat)
//! cargo run --bin admin -- db init
//!
//! # Shorten a URL
//! cargo run --bin admin -- shorten https://example.com/path?q=1
//!
//! # Resolve a code
//! cargo run --bin admin -- resolve aB3dE5fG
//!
//! # Show every code issued for a URL
//! cargo run --bin admin -- lookup https://example.com/path?q=1
//!
//! # Show the newest mappings
//! cargo run --bin admin -- recent --limit 20
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `DATABASE_URL` (or `DB_*` components), `BASE_URL`,
//! `SHORTEN_MAX_ATTEMPTS`, `STORE_TIMEOUT_MS` and the pool settings.

use url_forge::config::{self, Config};
use url_forge::domain::entities::UrlMapping;
use url_forge::domain::repositories::MappingStore;
use url_forge::infrastructure::persistence::PgMappingStore;
use url_forge::server::{build_service, connect_pool};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing url-forge.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Allocate a short code for a URL
    Shorten {
        /// Absolute http(s) URL
        url: String,
    },

    /// Print the URL stored for a short code
    Resolve {
        /// 8-character alphanumeric code
        code: String,
    },

    /// List every code issued for a URL
    Lookup {
        /// Exact URL as it was shortened
        url: String,
    },

    /// List the newest mappings
    Recent {
        /// Maximum number of rows (1-1000)
        #[arg(short, long, default_value_t = 20)]
        limit: i64,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Create the url_mappings table and indexes if missing
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;
    let pool = connect_pool(&config).await?;

    let result = match cli.command {
        Commands::Db { action } => handle_db_action(action, &pool, &config).await,
        Commands::Shorten { url } => handle_shorten(&pool, &config, &url).await,
        Commands::Resolve { code } => handle_resolve(&pool, &config, &code).await,
        Commands::Lookup { url } => handle_lookup(&pool, &config, &url).await,
        Commands::Recent { limit } => handle_recent(&pool, &config, limit).await,
    };

    pool.close().await;
    result
}

fn store_for(pool: &PgPool) -> Arc<dyn MappingStore> {
    Arc::new(PgMappingStore::new(Arc::new(pool.clone())))
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool, config: &Config) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            build_service(store_for(pool), config)
                .ping()
                .await
                .map_err(|e| anyhow::anyhow!("Database check failed: {}", e))?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Init => {
            println!("{}", "Initializing url_mappings schema...".bright_blue());

            PgMappingStore::init_schema(pool)
                .await
                .context("Schema initialization failed")?;

            println!("{}", "Schema ready".green().bold());
        }
    }

    Ok(())
}

async fn handle_shorten(pool: &PgPool, config: &Config, url: &str) -> Result<()> {
    let service = build_service(store_for(pool), config);

    let code = service
        .shorten(url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to shorten URL: {}", e))?;

    println!("{}", "Short code created".green().bold());
    println!("  Code: {}", code.bright_yellow().bold());
    println!(
        "  URL:  {}",
        format!("{}/r/{}", config.base_url.trim_end_matches('/'), code).cyan()
    );

    Ok(())
}

async fn handle_resolve(pool: &PgPool, config: &Config, code: &str) -> Result<()> {
    let service = build_service(store_for(pool), config);

    let url = service
        .resolve(code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to resolve {}: {}", code, e))?;

    println!("{}", url.cyan());
    Ok(())
}

async fn handle_lookup(pool: &PgPool, config: &Config, url: &str) -> Result<()> {
    let service = build_service(store_for(pool), config);

    let mappings = service
        .find_by_url(url)
        .await
        .map_err(|e| anyhow::anyhow!("Lookup failed: {}", e))?;

    if mappings.is_empty() {
        println!("{}", "  No codes issued for this URL".yellow());
        return Ok(());
    }

    print_mappings(&mappings);
    Ok(())
}

async fn handle_recent(pool: &PgPool, config: &Config, limit: i64) -> Result<()> {
    let service = build_service(store_for(pool), config);

    let mappings = service
        .recent(limit)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list mappings: {}", e))?;

    if mappings.is_empty() {
        println!("{}", "  No mappings yet".yellow());
        return Ok(());
    }

    print_mappings(&mappings);
    Ok(())
}

/// Prints mappings as a table.
///
/// ```text
///   ID    Code       Created              URL
///   ───────────────────────────────────────────────────────────────
///   1     aB3dE5fG   2025-06-01 10:30     https://example.com/path?q=1
/// ```
fn print_mappings(mappings: &[UrlMapping]) {
    println!(
        "  {:<5} {:<10} {:<20} {}",
        "ID".bright_white().bold(),
        "Code".bright_white().bold(),
        "Created".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for mapping in mappings {
        println!(
            "  {:<5} {:<10} {:<20} {}",
            mapping.id.to_string().bright_black(),
            mapping.short_code.bright_yellow(),
            mapping
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            mapping.url.cyan()
        );
    }

    println!();
    println!(
        "  Total: {}",
        mappings.len().to_string().bright_white().bold()
    );
}
