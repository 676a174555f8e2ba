//! `oyken`: command-line front end for the Oyken operations dashboard.
//!
//! Works directly on the CSV tables in the data directory; no server needed.
//!
//! # Usage
//!
//! ```
//! oyken submit --date 2025-01-13 --morning 420.50 --afternoon 610 --evening 0
//! oyken compare --date 2025-01-13
//! oyken income --year 2025 --month 1
//! oyken --data-dir ~/oyken cost add --source purchase --category Food --amount 300
//! ```

mod commands;
mod settings;

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use oyken_core::{Cents, clock::SystemClock, ledger::CostSource};
use oyken_store_csv::CsvStore;
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "oyken", about = "Daily sales, comparisons and statements for a restaurant")]
struct Cli {
  /// Path to a TOML config file (data_dir, [statement]).
  #[arg(short, long, value_name = "FILE", global = true)]
  config: Option<PathBuf>,

  /// Directory holding the CSV tables (default: ./data).
  #[arg(long, env = "OYKEN_DATA_DIR", global = true)]
  data_dir: Option<PathBuf>,

  /// Print JSON instead of text.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Record (or replace) the figures for one day.
  Submit(SubmitArgs),
  /// Compare a day against last year, the day before and its weekday average.
  Compare {
    /// Day to compare (default: today).
    #[arg(long)]
    date: Option<NaiveDate>,
  },
  /// Sales totals for a year or a month.
  Totals(PeriodArgs),
  /// Income statement with gross margin and EBITDA.
  Income(PeriodArgs),
  /// Breakeven sales against fixed costs.
  Breakeven(PeriodArgs),
  /// Purchases, shrinkage and operating expenses.
  #[command(subcommand)]
  Cost(CostCommand),
  /// Monthly closing stock values.
  #[command(subcommand)]
  Inventory(InventoryCommand),
  /// Staff positions and their employer cost.
  #[command(subcommand)]
  Payroll(PayrollCommand),
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
  /// Trading day (default: today).
  #[arg(long)]
  pub date:              Option<NaiveDate>,
  #[arg(long, value_parser = parse_amount)]
  pub morning:           Cents,
  #[arg(long, value_parser = parse_amount)]
  pub afternoon:         Cents,
  #[arg(long, value_parser = parse_amount)]
  pub evening:           Cents,
  #[arg(long, default_value_t = 0)]
  pub guests_morning:    u32,
  #[arg(long, default_value_t = 0)]
  pub guests_afternoon:  u32,
  #[arg(long, default_value_t = 0)]
  pub guests_evening:    u32,
  #[arg(long, default_value_t = 0)]
  pub tickets_morning:   u32,
  #[arg(long, default_value_t = 0)]
  pub tickets_afternoon: u32,
  #[arg(long, default_value_t = 0)]
  pub tickets_evening:   u32,
  #[arg(long, default_value = "")]
  pub notes:             String,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct PeriodArgs {
  /// Calendar year (default: the current year).
  #[arg(long)]
  pub year:  Option<i32>,
  /// Month 1-12; omit for the whole year.
  #[arg(long)]
  pub month: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum CostCommand {
  /// Add a cost entry.
  Add {
    /// Date of the cost (default: today).
    #[arg(long)]
    date:        Option<NaiveDate>,
    /// purchase, shrinkage or expense.
    #[arg(long)]
    source:      CostSource,
    /// Supplier family or expense category.
    #[arg(long)]
    category:    String,
    #[arg(long, value_parser = parse_amount)]
    amount:      Cents,
    #[arg(long, default_value = "")]
    description: String,
    /// Count this expense as a fixed cost.
    #[arg(long)]
    fixed:       bool,
  },
  /// List cost entries.
  List {
    #[arg(long)]
    year:   Option<i32>,
    #[arg(long)]
    month:  Option<u32>,
    #[arg(long)]
    source: Option<CostSource>,
  },
  /// Delete a cost entry by id.
  Delete { id: Uuid },
}

#[derive(Subcommand, Debug)]
pub enum InventoryCommand {
  /// Set the closing stock value of a month.
  Set {
    #[arg(long)]
    year:       i32,
    #[arg(long)]
    month:      u32,
    #[arg(long, value_parser = parse_amount)]
    value:      Cents,
    /// Count date (default: today).
    #[arg(long)]
    updated_on: Option<NaiveDate>,
  },
  /// List snapshots with their month-on-month change.
  List,
}

#[derive(Subcommand, Debug)]
pub enum PayrollCommand {
  /// Add a position.
  Add {
    #[arg(long)]
    year:         i32,
    #[arg(long)]
    title:        String,
    /// Gross annual salary of one person in the position.
    #[arg(long, value_parser = parse_amount)]
    annual_gross: Cents,
    /// One count for every month, or twelve comma-separated counts.
    #[arg(long, value_delimiter = ',', default_value = "1")]
    headcount:    Vec<u32>,
    /// Part of the structural (fixed) staff.
    #[arg(long)]
    structural:   bool,
  },
  /// List positions with their annual employer cost.
  List {
    #[arg(long)]
    year: Option<i32>,
  },
  /// Delete a position by id.
  Delete { id: Uuid },
}

fn parse_amount(s: &str) -> Result<Cents, String> {
  Cents::parse(s).ok_or_else(|| format!("not an amount: {s:?}"))
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  // Quiet by default so command output stays readable.
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::resolve(cli.config.as_deref(), cli.data_dir)?;

  let store = CsvStore::open(&settings.data_dir)
    .await
    .with_context(|| format!("opening data directory {}", settings.data_dir.display()))?;
  tracing::debug!(dir = %store.dir().display(), "opened data directory");

  let ctx = commands::Context {
    store:     &store,
    clock:     &SystemClock,
    statement: &settings.statement,
    json:      cli.json,
  };
  let mut stdout = io::stdout().lock();
  commands::run(&ctx, cli.command, &mut stdout).await
}
