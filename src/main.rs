mod automation;
mod config;
mod error;
mod extract;
mod sentiment;
mod sink;
mod table;
mod walker;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use crate::config::{Backend, RunConfig};
use crate::sink::csv::CsvOutcome;
use crate::table::HotelIdentity;

#[derive(Parser)]
#[command(name = "hotel_reviews", about = "Guest review scraper with sentiment labeling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    /// OpenAI-compatible chat completions API
    Llm,
    /// Local text-classification endpoint
    Local,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape one listing's reviews, label them, and persist the table
    Run {
        /// Listing URL whose review widget to walk
        #[arg(long)]
        url: String,
        /// Listing identifier stored on every row
        #[arg(long)]
        hotel_id: String,
        /// Human-readable listing name stored on every row
        #[arg(long)]
        hotel_name: String,
        /// Review source label stored on every row
        #[arg(long, default_value = "booking.com")]
        source: String,
        /// Output CSV path
        #[arg(long, default_value = "data/reviews.csv")]
        csv: PathBuf,
        /// SQLite database path
        #[arg(long, default_value = "data/reviews.sqlite")]
        db: PathBuf,
        /// Sentiment backend to call
        #[arg(long, value_enum, default_value_t = BackendArg::Llm)]
        classifier: BackendArg,
        /// Override the settle delay after navigation clicks (ms)
        #[arg(long)]
        settle_ms: Option<u64>,
        /// Walk at most this many pages
        #[arg(short = 'n', long)]
        limit: Option<u32>,
    },
    /// Show review store statistics
    Stats {
        /// SQLite database path
        #[arg(long, default_value = "data/reviews.sqlite")]
        db: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            url,
            hotel_id,
            hotel_name,
            source,
            csv,
            db,
            classifier,
            settle_ms,
            limit,
        } => {
            let backend = match classifier {
                BackendArg::Llm => Backend::Llm,
                BackendArg::Local => Backend::Local,
            };
            let cfg = RunConfig::resolve(
                url,
                HotelIdentity {
                    hotel_id,
                    hotel_name,
                    source_name: source,
                },
                csv,
                db,
                backend,
                settle_ms,
                limit,
            )?;
            run_listing(cfg).await
        }
        Commands::Stats { db } => show_stats(&db),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn run_listing(cfg: RunConfig) -> anyhow::Result<()> {
    let classifier = sentiment::build_classifier(&cfg.classifier);

    let session = automation::webdriver::Session::connect(&cfg.webdriver_url).await?;
    println!(
        "Walking reviews for {} ({})...",
        cfg.hotel.hotel_name, cfg.walk.listing_url
    );
    // The browser window is released on success and failure alike
    let walked = walker::walk(&session, classifier.as_ref(), &cfg.walk).await;
    if let Err(e) = session.close().await {
        warn!("failed to close browser session: {}", e);
    }
    let outcome = walked?;

    for (field, len) in outcome.columns.field_lengths() {
        info!("extracted {} {} values", len, field);
    }
    if outcome.columns.is_empty() {
        println!("No review cards found across {} pages.", outcome.pages);
    }

    let rows = table::assemble(outcome.columns, &cfg.hotel)?;
    println!(
        "Assembled {} reviews across {} pages.",
        rows.len(),
        outcome.pages
    );

    match sink::csv::write(&cfg.csv_path, &rows)? {
        CsvOutcome::Written(n) => println!(
            "Review data saved to '{}' ({} rows).",
            cfg.csv_path.display(),
            n
        ),
        CsvOutcome::Declined => println!("File not overwritten. Review data not saved."),
    }

    let conn = sink::db::connect(&cfg.db_path)?;
    sink::db::init_schema(&conn)?;
    let upserted = sink::db::upsert_reviews(&conn, &rows)?;
    sink::db::record_run(&conn, &cfg.hotel, outcome.pages, rows.len(), &upserted)?;
    println!(
        "Upserted into {}: {} new, {} duplicate.",
        cfg.db_path.display(),
        upserted.inserted,
        upserted.skipped
    );

    Ok(())
}

fn show_stats(db: &Path) -> anyhow::Result<()> {
    let conn = sink::db::connect(db)?;
    sink::db::init_schema(&conn)?;
    let s = sink::db::get_stats(&conn)?;

    println!("Reviews:    {}", s.reviews);
    println!("Hotels:     {}", s.hotels);
    println!("Labeled:    {}", s.labeled);
    println!("With reply: {}", s.with_reply);

    if !s.by_sentiment.is_empty() {
        println!("\n--- Sentiment ---");
        for (label, count) in &s.by_sentiment {
            println!("  {:<10} {}", label, count);
        }
    }

    if !s.recent_runs.is_empty() {
        println!("\n--- Recent runs ---");
        for run in &s.recent_runs {
            println!(
                "  {} {} via {}: {} rows ({} new, {} duplicate) over {} pages",
                run.finished_at,
                run.hotel_id,
                run.source_name,
                run.rows_assembled,
                run.rows_inserted,
                run.rows_skipped,
                run.pages
            );
        }
    }

    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
