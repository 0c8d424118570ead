//! CLI administration tool for link-shortener.
//!
//! Provides commands for viewing click statistics, maintaining links and
//! checking the database without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Clicks per day for January
//! cargo run --bin admin -- stats --from 2024-01-01 --to 2024-01-31
//!
//! # Clicks per month for one link
//! cargo run --bin admin -- stats --from 2024-01-01 --to 2024-06-30 --by month --link 42
//!
//! # List and delete links
//! cargo run --bin admin -- links list --limit 50
//! cargo run --bin admin -- links delete 42
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_HOST`/`DB_PORT`/`DB_USER`/`DB_PASSWORD`/`DB_NAME`

use link_shortener::application::services::{Granularity, LinkService, StatsService};
use link_shortener::config::{Config, mask_connection_string};
use link_shortener::domain::event_bus::{EventBus, OverflowPolicy};
use link_shortener::infrastructure::persistence::{MIGRATOR, PgLinkRepository, PgStatsRepository};

use anyhow::{Context, Result};
use chrono::{Months, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing link-shortener.
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
    /// Show click statistics for a date range
    Stats {
        /// First day (YYYY-MM-DD), defaults to 30 days ago
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day (YYYY-MM-DD), defaults to today
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Bucket size: day or month
        #[arg(long, default_value = "day")]
        by: Granularity,

        /// Only show the total for this link id
        #[arg(long)]
        link: Option<i64>,
    },

    /// Manage links
    Links {
        #[command(subcommand)]
        action: LinksAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Link maintenance subcommands.
#[derive(Subcommand)]
enum LinksAction {
    /// List live links, newest first
    List {
        #[arg(long, default_value_t = 20)]
        limit: i64,

        #[arg(long, default_value_t = 0)]
        offset: i64,
    },

    /// Soft-delete a link
    Delete {
        /// Link id
        id: i64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = Config::load_database_url().context("Database is not configured")?;

    let pool = PgPool::connect(&database_url)
        .await
        .with_context(|| format!("Failed to connect to {}", mask_connection_string(&database_url)))?;

    match cli.command {
        Commands::Stats { from, to, by, link } => handle_stats(&pool, from, to, by, link).await?,
        Commands::Links { action } => handle_links_action(action, &pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool, &database_url).await?,
    }

    Ok(())
}

/// Prints a bucketed click report, or a single link's total.
async fn handle_stats(
    pool: &PgPool,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    by: Granularity,
    link: Option<i64>,
) -> Result<()> {
    let today = Utc::now().date_naive();
    let to = to.unwrap_or(today);
    let from = from.unwrap_or_else(|| to.checked_sub_months(Months::new(1)).unwrap_or(to));

    if from > to {
        anyhow::bail!("--from must not be after --to");
    }

    let service = StatsService::new(Arc::new(PgStatsRepository::new(Arc::new(pool.clone()))));

    println!(
        "{} {} .. {}",
        "📊 Clicks".bright_blue().bold(),
        from.to_string().cyan(),
        to.to_string().cyan()
    );
    println!();

    if let Some(link_id) = link {
        let total = service
            .link_totals(link_id, from, to)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to load stats: {}", e))?;

        println!(
            "  Link {}: {}",
            link_id.to_string().bright_black(),
            total.to_string().bright_white().bold()
        );
        println!();
        return Ok(());
    }

    let report = service
        .get_stats(by, from, to)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load stats: {}", e))?;

    println!(
        "  {:<12} {:<12} {:>10}",
        "From".bright_white().bold(),
        "To".bright_white().bold(),
        "Clicks".bright_white().bold()
    );
    println!("  {}", "─".repeat(36).bright_black());

    for bucket in &report.buckets {
        println!(
            "  {:<12} {:<12} {:>10}",
            bucket.period_from.to_string(),
            bucket.period_to.to_string(),
            bucket.clicks.to_string().green()
        );
    }

    println!();
    println!(
        "  Total: {}",
        report.total_clicks.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Dispatches link maintenance commands.
async fn handle_links_action(action: LinksAction, pool: &PgPool) -> Result<()> {
    let repository = Arc::new(PgLinkRepository::new(Arc::new(pool.clone())));
    // Nobody consumes lifecycle events here; a small bus is enough.
    let service = LinkService::new(repository, EventBus::new(16, OverflowPolicy::Drop));

    match action {
        LinksAction::List { limit, offset } => list_links(&service, limit, offset).await,
        LinksAction::Delete { id, yes } => delete_link(&service, id, yes).await,
    }
}

async fn list_links(
    service: &LinkService<PgLinkRepository>,
    limit: i64,
    offset: i64,
) -> Result<()> {
    println!("{}", "🔗 Links".bright_blue().bold());
    println!();

    let (links, count) = service
        .list_links(limit.clamp(1, 1000), offset.max(0))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<6} {:<14} {:<20} {}",
        "ID".bright_white().bold(),
        "Hash".bright_white().bold(),
        "Created".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for link in &links {
        println!(
            "  {:<6} {:<14} {:<20} {}",
            link.id.to_string().bright_black(),
            link.hash.cyan(),
            link.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            link.original_url
        );
    }

    println!();
    println!(
        "  Showing {} of {}",
        links.len().to_string().bright_white().bold(),
        count.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

async fn delete_link(
    service: &LinkService<PgLinkRepository>,
    id: i64,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🗑  Delete Link".bright_blue().bold());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Soft-delete link {id}?"))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    service
        .delete_link(id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    println!("{}", "✅ Link deleted".green().bold());
    println!();

    Ok(())
}

/// Dispatches database commands.
async fn handle_db_action(action: DbAction, pool: &PgPool, database_url: &str) -> Result<()> {
    match action {
        DbAction::Check => {
            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await
                .context("Database query failed")?;

            println!("{}", "✅ Database connection OK".green().bold());
            println!("  URL:     {}", mask_connection_string(database_url).cyan());
            println!("  Version: {}", version.bright_black());
        }
        DbAction::Migrate => {
            MIGRATOR
                .run(pool)
                .await
                .context("Failed to run migrations")?;

            println!("{}", "✅ Migrations applied".green().bold());
        }
    }

    Ok(())
}
