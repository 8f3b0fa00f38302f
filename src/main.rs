use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

mod advice;
mod aggregate;
mod db;
mod error;
mod models;
mod pipeline;
mod ratios;
mod render;
mod report;
mod score;

use error::DiagnosticsError;
use render::{DocumentRenderer, JsonRenderer, MarkdownRenderer};

#[derive(Parser)]
#[command(name = "creator-diagnostics")]
#[command(about = "Performance scoring and recommendations for creator pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load demo profiles with realistic traffic
    Seed,
    /// Import daily metrics from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Print the score breakdown and recommendations
    Score {
        /// Profile handle; falls back to CREATOR_HANDLE
        #[arg(long, env = "CREATOR_HANDLE")]
        handle: Option<String>,
        #[arg(long, default_value_t = 30, allow_negative_numbers = true)]
        window: i64,
        /// Emit the diagnostics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a performance report document
    Report {
        /// Profile handle; falls back to CREATOR_HANDLE
        #[arg(long, env = "CREATOR_HANDLE")]
        handle: Option<String>,
        #[arg(long, default_value_t = 30, allow_negative_numbers = true)]
        window: i64,
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

impl OutputFormat {
    fn renderer(self) -> Box<dyn DocumentRenderer> {
        match self {
            OutputFormat::Markdown => Box::new(MarkdownRenderer),
            OutputFormat::Json => Box::new(JsonRenderer),
        }
    }
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,creator_diagnostics=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::InitDb => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect().await?;
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let pool = connect().await?;
            let imported = db::import_csv(&pool, &csv).await?;
            println!("Imported {imported} daily metrics from {}.", csv.display());
        }
        Commands::Score {
            handle,
            window,
            json,
        } => {
            // Identity and window are checked before touching the database.
            let handle = pipeline::resolve_caller(handle.as_deref())?;
            let window_days = aggregate::validate_window(window)?;
            let pool = connect().await?;

            let snapshot = db::load_snapshot(&pool, &handle, window_days, Utc::now())
                .await?
                .ok_or(DiagnosticsError::ProfileNotFound {
                    handle: handle.clone(),
                })?;
            let diagnostics = pipeline::diagnose(&snapshot, window)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&diagnostics)?);
                return Ok(());
            }

            let summary = &diagnostics.summary;
            let score = &diagnostics.score;
            println!(
                "{} (@{}) over {}:",
                snapshot.profile.display_name,
                snapshot.profile.handle,
                report::window_label(window_days).to_lowercase()
            );
            println!(
                "- {} views ({} per day), {} unique, {} clicks ({:.1}% conversion)",
                summary.total_views,
                summary.avg_views_per_day,
                summary.total_unique_views,
                summary.total_clicks,
                diagnostics.ratios.conversion_rate
            );
            println!(
                "- score {:.1}/100 [{}]: traffic {:.1}, conversion {:.1}, content {:.1}, retention {:.1}",
                score.total,
                score.tier.as_str(),
                score.traffic_score,
                score.conversion_score,
                score.content_score,
                score.retention_score
            );

            if diagnostics.advice.is_empty() {
                println!("No recommendations for this window.");
            }
            for item in &diagnostics.advice {
                println!(
                    "{}. [{}] {}: {}",
                    item.priority,
                    item.status.as_str(),
                    item.category,
                    item.problem
                );
            }
        }
        Commands::Report {
            handle,
            window,
            format,
            out_dir,
        } => {
            let handle = pipeline::resolve_caller(handle.as_deref())?;
            let window_days = aggregate::validate_window(window)?;
            let pool = connect().await?;

            let now = Utc::now();
            let snapshot = db::load_snapshot(&pool, &handle, window_days, now).await?;
            let renderer = format.renderer();
            let document = pipeline::generate_report(
                &handle,
                snapshot.as_ref(),
                window,
                now,
                renderer.as_ref(),
            )?;

            let out = out_dir.join(&document.filename);
            std::fs::write(&out, &document.bytes)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
