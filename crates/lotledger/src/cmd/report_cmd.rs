//! lotledger-report - Generate tax-lot reports from portfolio files.
//!
//! # Usage
//!
//! ```bash
//! lotledger-report portfolio.json holdings
//! lotledger-report portfolio.json holdings --as-of 2024-06-30 --lots
//! lotledger-report portfolio.json timeline --security ACME
//! lotledger-report portfolio.json performance --as-of 2024-06-30 --lookback 1y
//! ```
//!
//! # Reports
//!
//! - `holdings` - Shares, cost basis, value and gains per security
//! - `timeline` - Every dated entry with the action that produced it
//! - `performance` - Market value change over a trailing period

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use lotledger_core::{LotIdGenerator, SecurityLot};
use lotledger_tracker::{
    DateEntry, DateOffset, DisposalMethod, PriceDatabase, SecurityTransactionTracker,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::portfolio::PortfolioFile;

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON output for tooling integration
    Json,
}

/// Generate tax-lot reports from a portfolio file.
#[derive(Parser, Debug)]
#[command(name = "lotledger-report")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The portfolio file to process
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// The report to generate
    #[command(subcommand)]
    pub report: Report,

    /// Lot selection for sales (overrides the file's options)
    #[arg(short, long, global = true, value_name = "FIFO|LIFO")]
    pub method: Option<DisposalMethod>,

    /// Fail when a transaction date has no market price
    #[arg(long, global = true)]
    pub strict_prices: bool,

    /// Output format (text or json)
    #[arg(long, short = 'f', value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available reports.
#[derive(Subcommand, Debug)]
pub enum Report {
    /// Show holdings per security
    Holdings {
        /// Report as of this date (default: today)
        #[arg(long, value_name = "DATE")]
        as_of: Option<NaiveDate>,
        /// Also list the individual lots
        #[arg(long)]
        lots: bool,
    },
    /// Show every dated entry
    Timeline {
        /// Only this security
        #[arg(short, long)]
        security: Option<String>,
    },
    /// Show value change over a trailing period
    Performance {
        /// End of the period (default: today)
        #[arg(long, value_name = "DATE")]
        as_of: Option<NaiveDate>,
        /// Length of the period, e.g. 30d, 12w, 6m, 1y
        #[arg(long, default_value = "1y")]
        lookback: DateOffset,
    },
}

#[derive(Debug, Serialize)]
struct LotRow {
    lot_id: String,
    cost_basis_date: NaiveDate,
    shares: Decimal,
    cost_basis: Decimal,
    holding_days: i64,
}

impl LotRow {
    fn new(lot: &SecurityLot, as_of: NaiveDate) -> Self {
        Self {
            lot_id: lot.lot_id().to_string(),
            cost_basis_date: lot.cost_basis_date(),
            shares: lot.shares(),
            cost_basis: lot.cost_basis(),
            holding_days: lot.holding_days(as_of),
        }
    }
}

#[derive(Debug, Serialize)]
struct HoldingRow {
    security: String,
    as_of: NaiveDate,
    shares: Decimal,
    cost_basis: Decimal,
    market_value: Option<Decimal>,
    unrealized_gain: Option<Decimal>,
    realized_gain: Decimal,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    lots: Vec<LotRow>,
}

#[derive(Debug, Serialize)]
struct TimelineRow {
    security: String,
    date: NaiveDate,
    action: String,
    shares: Decimal,
    cost_basis: Decimal,
    market_price: Option<Decimal>,
    market_value: Option<Decimal>,
    realized_gain: Decimal,
}

impl TimelineRow {
    fn new(security: &str, entry: &DateEntry) -> Self {
        Self {
            security: security.to_string(),
            date: entry.date(),
            action: entry
                .action()
                .map_or_else(|| "opening balance".to_string(), ToString::to_string),
            shares: entry.total_shares(),
            cost_basis: entry.cost_basis(),
            market_price: entry.market_price(),
            market_value: entry.market_value(),
            realized_gain: entry.realized_gain(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PerformanceRow {
    security: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    start_value: Decimal,
    end_value: Decimal,
    change: Decimal,
    simple_return: Option<Decimal>,
}

/// Main entry point for the report command.
pub fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut stdout = io::stdout().lock();
    match run(&args, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(Level::DEBUG.as_str())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Load, replay and render the requested report to `out`.
pub fn run<W: Write>(args: &Args, out: &mut W) -> Result<()> {
    let portfolio = PortfolioFile::load(&args.file)?;

    let mut config = portfolio.options;
    if let Some(method) = args.method {
        config.disposal = method;
    }
    if args.strict_prices {
        config.strict_prices = true;
    }

    let prices = portfolio.price_database();
    let ids = LotIdGenerator::new();
    let trackers = portfolio.build_trackers(&ids, config, &prices)?;
    tracing::info!(
        securities = trackers.len(),
        disposal = %config.disposal,
        "portfolio replayed"
    );

    let today = Local::now().date_naive();
    match &args.report {
        Report::Holdings { as_of, lots } => {
            let as_of = as_of.unwrap_or(today);
            let rows: Vec<HoldingRow> = trackers
                .iter()
                .filter_map(|tracker| holding_row(tracker, &prices, as_of, *lots))
                .collect();
            match args.format {
                OutputFormat::Text => write_holdings(out, &rows)?,
                OutputFormat::Json => write_json(out, &rows)?,
            }
        }
        Report::Timeline { security } => {
            let rows: Vec<TimelineRow> = trackers
                .iter()
                .filter(|t| security.is_none() || security.as_deref() == Some(t.security()))
                .flat_map(|t| t.entries().map(|e| TimelineRow::new(t.security(), e)))
                .collect();
            match args.format {
                OutputFormat::Text => write_timeline(out, &rows)?,
                OutputFormat::Json => write_json(out, &rows)?,
            }
        }
        Report::Performance { as_of, lookback } => {
            let as_of = as_of.unwrap_or(today);
            let rows: Vec<PerformanceRow> = trackers
                .iter()
                .filter_map(|tracker| {
                    let change = tracker.period_change(as_of, *lookback, &prices)?;
                    Some(PerformanceRow {
                        security: tracker.security().to_string(),
                        start_date: change.start_date,
                        end_date: change.end_date,
                        start_value: change.start_value,
                        end_value: change.end_value,
                        change: change.change(),
                        simple_return: change.simple_return(),
                    })
                })
                .collect();
            match args.format {
                OutputFormat::Text => write_performance(out, &rows, *lookback)?,
                OutputFormat::Json => write_json(out, &rows)?,
            }
        }
    }

    out.flush().context("failed to write report")
}

fn holding_row(
    tracker: &SecurityTransactionTracker<'_>,
    prices: &PriceDatabase,
    as_of: NaiveDate,
    with_lots: bool,
) -> Option<HoldingRow> {
    let entry = tracker.date_entry(as_of)?;
    let lots = if with_lots {
        entry.lots().iter().map(|lot| LotRow::new(lot, as_of)).collect()
    } else {
        Vec::new()
    };
    Some(HoldingRow {
        security: tracker.security().to_string(),
        as_of,
        shares: entry.total_shares(),
        cost_basis: entry.cost_basis(),
        market_value: tracker.market_value_at(as_of, prices),
        unrealized_gain: tracker.unrealized_gain_at(as_of, prices),
        realized_gain: entry.realized_gain(),
        lots,
    })
}

fn opt(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.round_dp(2).to_string())
}

fn write_json<W: Write, T: Serialize>(out: &mut W, rows: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, rows).context("failed to serialize report")?;
    writeln!(out)?;
    Ok(())
}

fn write_holdings<W: Write>(out: &mut W, rows: &[HoldingRow]) -> Result<()> {
    writeln!(
        out,
        "{:<10} {:>12} {:>14} {:>14} {:>14} {:>14}",
        "Security", "Shares", "Cost Basis", "Value", "Unrealized", "Realized"
    )?;
    writeln!(out, "{}", "-".repeat(83))?;
    for row in rows {
        writeln!(
            out,
            "{:<10} {:>12} {:>14} {:>14} {:>14} {:>14}",
            row.security,
            row.shares,
            row.cost_basis.round_dp(2),
            opt(row.market_value),
            opt(row.unrealized_gain),
            row.realized_gain.round_dp(2)
        )?;
        for lot in &row.lots {
            writeln!(
                out,
                "  {:<8} {:>12} {:>14} {} ({} days)",
                lot.lot_id, lot.shares, lot.cost_basis, lot.cost_basis_date, lot.holding_days
            )?;
        }
    }
    Ok(())
}

fn write_timeline<W: Write>(out: &mut W, rows: &[TimelineRow]) -> Result<()> {
    for row in rows {
        writeln!(
            out,
            "{} {:<8} {:>12} {:>14} {:>12}  {}",
            row.date,
            row.security,
            row.shares,
            row.cost_basis.round_dp(2),
            opt(row.market_price),
            row.action
        )?;
    }
    Ok(())
}

fn write_performance<W: Write>(
    out: &mut W,
    rows: &[PerformanceRow],
    lookback: DateOffset,
) -> Result<()> {
    writeln!(out, "Change over {lookback}")?;
    for row in rows {
        let pct = row
            .simple_return
            .map_or_else(|| "-".to_string(), |r| format!("{}%", (r * Decimal::ONE_HUNDRED).round_dp(2)));
        writeln!(
            out,
            "{:<10} {} {:>14} -> {} {:>14} {:>14} {:>9}",
            row.security,
            row.start_date,
            row.start_value.round_dp(2),
            row.end_date,
            row.end_value.round_dp(2),
            row.change.round_dp(2),
            pct
        )?;
    }
    Ok(())
}
