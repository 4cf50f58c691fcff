//! CLI administration tool for linkdrop.
//!
//! Inspects stored aliases and performs database maintenance without going
//! through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Show a stored alias
//! cargo run --bin admin -- alias show abcde12345
//!
//! # Count aliases by kind
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//!
//! # Drop everything and re-run migrations
//! cargo run --bin admin -- db fresh --yes
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;

/// CLI tool for managing linkdrop.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Inspect aliases
    Alias {
        #[command(subcommand)]
        action: AliasAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Alias inspection subcommands.
#[derive(Subcommand)]
enum AliasAction {
    /// Show a stored alias, including its internal storage key
    Show {
        /// The alias to look up
        alias: String,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Drop all tables and re-run migrations
    Fresh {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(sqlx::FromRow)]
struct AliasRow {
    kind: String,
    redirect_to: Option<String>,
    filename: Option<String>,
    storage_key: Option<String>,
    created_at: DateTime<Utc>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Alias { action } => handle_alias_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_alias_action(action: AliasAction, pool: &PgPool) -> Result<()> {
    match action {
        AliasAction::Show { alias } => show_alias(pool, &alias).await,
    }
}

/// Prints one alias record.
///
/// # Output Format
///
/// ```text
/// 🔎 Alias abcde12345
///
///   Kind:        LINK
///   Redirect to: https://example.com
///   Created:     2025-01-15 10:30:00 UTC
/// ```
async fn show_alias(pool: &PgPool, alias: &str) -> Result<()> {
    println!("{} {}", "🔎 Alias".bright_blue().bold(), alias.cyan());
    println!();

    let row = sqlx::query_as::<_, AliasRow>(
        r#"
        SELECT kind, redirect_to, filename, storage_key, created_at
        FROM aliases
        WHERE alias = $1
        "#,
    )
    .bind(alias)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        println!("{}", "  Not found".yellow());
        return Ok(());
    };

    println!("  Kind:        {}", row.kind.bright_white().bold());
    if let Some(url) = &row.redirect_to {
        println!("  Redirect to: {}", url.cyan());
    }
    if let Some(filename) = &row.filename {
        println!("  Filename:    {}", filename.cyan());
    }
    if let Some(key) = &row.storage_key {
        println!("  Storage key: {}", key.bright_black());
    }
    println!(
        "  Created:     {}",
        row.created_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
            .bright_black()
    );
    println!();

    Ok(())
}

/// Displays alias counts by kind.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM aliases WHERE kind = 'LINK'")
        .fetch_one(pool)
        .await?;

    let files: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM aliases WHERE kind = 'FILE'")
        .fetch_one(pool)
        .await?;

    println!("  Links: {}", links.to_string().bright_green().bold());
    println!("  Files: {}", files.to_string().bright_green().bold());
    println!();

    Ok(())
}

/// Handles database diagnostic and maintenance commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1")
                .execute(pool)
                .await
                .context("Database query failed")?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Fresh { yes } => {
            println!("{}", "🧨 Fresh database".bright_blue().bold());
            println!();
            println!(
                "{}",
                "⚠️  This drops every table in the public schema.".red().bold()
            );
            println!();

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt("Drop all data and re-run migrations?")
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            sqlx::query("DROP SCHEMA public CASCADE")
                .execute(pool)
                .await
                .context("Failed to drop schema")?;
            sqlx::query("CREATE SCHEMA public")
                .execute(pool)
                .await
                .context("Failed to recreate schema")?;

            sqlx::migrate!("./migrations")
                .run(pool)
                .await
                .context("Failed to run migrations")?;

            println!("{}", "✅ Database recreated".green().bold());
        }
    }

    Ok(())
}
