//! **FinSight CLI**
//!
//! Command-line interface for the FinSight XBRL ETL pipeline.
//! `load` drives one `(ticker, year, filing_type)` filing (or a
//! `--tickers-file` batch of them) through C1→C8; `validate` re-runs the
//! C8 check suite standalone over whatever is already in the warehouse.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finsight_core::config::Config;
use finsight_core::database::{create_pool, run_migrations};
use finsight_core::models::FilingType;
use finsight_pipeline::orchestrator::Pipeline;

#[derive(Parser)]
#[command(name = "finsight")]
#[command(about = "FinSight XBRL financial-filing ETL pipeline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load one filing, or a batch of filings from a CSV file, into the warehouse
    Load {
        /// Ticker symbol (e.g. AAPL)
        #[arg(short, long)]
        ticker: Option<String>,

        /// Fiscal year
        #[arg(short, long)]
        year: Option<i32>,

        /// Filing type: 10-K, 10-Q, or 20-F
        #[arg(short = 'f', long = "filing-type")]
        filing_type: Option<String>,

        /// CSV file of `ticker,year,filing_type` rows for a batch load
        #[arg(long)]
        tickers_file: Option<PathBuf>,
    },

    /// Run the validator suite over every filing already loaded
    Validate,
}

/// One row of a `--tickers-file` batch ("a batch run processes
/// filings in a simple outer loop").
#[derive(Debug, Deserialize)]
struct TickerRow {
    ticker: String,
    year: i32,
    filing_type: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "finsight=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))?;

    run_migrations(&config.database_url).await.context("running database migrations")?;
    let pool = create_pool(&config.database_url).await.context("connecting to the database")?;

    match cli.command {
        Commands::Load { ticker, year, filing_type, tickers_file } => {
            let rows = load_rows(ticker, year, filing_type, tickers_file)?;
            run_load_batch(config, pool, rows).await?;
        }
        Commands::Validate => {
            run_validate(&pool).await?;
        }
    }

    Ok(())
}

/// Resolves a `load` invocation's target rows from either the three
/// scalar flags or a `--tickers-file` CSV, rejecting an invocation that
/// supplies neither or both.
fn load_rows(ticker: Option<String>, year: Option<i32>, filing_type: Option<String>, tickers_file: Option<PathBuf>) -> Result<Vec<TickerRow>> {
    match (ticker, year, filing_type, tickers_file) {
        (Some(ticker), Some(year), Some(filing_type), None) => Ok(vec![TickerRow { ticker, year, filing_type }]),
        (None, None, None, Some(path)) => read_tickers_file(&path),
        (None, None, None, None) => Err(anyhow::anyhow!("load requires either --ticker/--year/--filing-type or --tickers-file")),
        _ => Err(anyhow::anyhow!("load takes either --ticker/--year/--filing-type or --tickers-file, not a mix")),
    }
}

fn read_tickers_file(path: &PathBuf) -> Result<Vec<TickerRow>> {
    let mut reader = csv::Reader::from_path(path).with_context(|| format!("opening tickers file {}", path.display()))?;
    reader.deserialize().collect::<Result<Vec<TickerRow>, csv::Error>>().context("parsing tickers file")
}

async fn run_load_batch(config: Config, pool: finsight_core::database::DatabasePool, rows: Vec<TickerRow>) -> Result<()> {
    let pipeline = Pipeline::new(config, pool);

    let progress = ProgressBar::new(rows.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut failures = 0usize;
    for row in rows {
        let Some(filing_type) = FilingType::parse(&row.filing_type) else {
            warn!(ticker = row.ticker, filing_type = row.filing_type, "skipping row with unrecognized filing type");
            failures += 1;
            progress.inc(1);
            continue;
        };

        progress.set_message(format!("{} {} {}", row.ticker, row.year, filing_type.as_str()));
        match pipeline.run_pipeline(&row.ticker, row.year, filing_type).await {
            Ok(filing_id) => info!(ticker = row.ticker, year = row.year, %filing_id, "filing loaded"),
            Err(e) => {
                error!(ticker = row.ticker, year = row.year, error = %e, "filing load failed");
                failures += 1;
            }
        }
        progress.inc(1);
    }
    progress.finish_with_message("done");

    if failures > 0 {
        println!("{failures} filing(s) failed to load; see logs above for details");
    }
    Ok(())
}

async fn run_validate(pool: &finsight_core::database::DatabasePool) -> Result<()> {
    let report = finsight_pipeline::validate(pool).await.context("running validation suite")?;

    let total_checks: usize = report.filings.iter().map(|f| f.checks.len()).sum();
    let failed_checks: usize = report.filings.iter().flat_map(|f| &f.checks).filter(|c| !c.passed).count();
    println!("Validated {} filing(s), {total_checks} check(s), {failed_checks} failed", report.filings.len());

    for filing in &report.filings {
        let score = filing.weighted_score();
        println!("  filing {}: weighted score {:.3}", filing.filing_id, score);
        for check in filing.checks.iter().filter(|c| !c.passed) {
            println!("    FAILED {} (severity {:?}): {:?}", check.check_name, check.severity, check.details);
        }
    }

    if !report.population_checks.is_empty() {
        println!("Population checks:");
        for check in &report.population_checks {
            let status = if check.passed { "ok" } else { "FAILED" };
            println!("  [{status}] {}", check.check_name);
        }
    }

    Ok(())
}
