//! Command handlers. Each one reads what it needs from the store, computes,
//! and writes either a text report or JSON to `out`.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::{Datelike, NaiveDate};
use oyken_core::{
  aggregate::{MonthTotals, PeriodTotals, monthly_totals, totals_for},
  calendar::Period,
  clock::{Clock, RequestContext},
  comparison::{Benchmark, DayComparison, MetricVariances, compare_day},
  ledger::{
    CostFilter, InventorySnapshot, NewCostEntry, NewPayrollPosition, payroll_cost,
    stock_movements,
  },
  record::DailyEntry,
  resolver::Confidence,
  statement::{IncomeLine, StatementConfig, breakeven, income_statement},
  store::OperationsStore,
  variance::Variance,
};
use serde::Serialize;

use crate::{Command, CostCommand, InventoryCommand, PayrollCommand, PeriodArgs, SubmitArgs};

/// What every command runs against.
pub struct Context<'a, S> {
  pub store:     &'a S,
  pub clock:     &'a dyn Clock,
  pub statement: &'a StatementConfig,
  pub json:      bool,
}

impl<S> Context<'_, S> {
  fn today(&self) -> NaiveDate { self.clock.today() }

  fn period(&self, args: PeriodArgs) -> Result<Period> {
    let year = args.year.unwrap_or_else(|| self.today().year());
    Ok(Period::new(year, args.month)?)
  }
}

pub async fn run<S>(ctx: &Context<'_, S>, command: Command, out: &mut impl Write) -> Result<()>
where
  S: OperationsStore,
{
  match command {
    Command::Submit(args) => submit(ctx, args, out).await,
    Command::Compare { date } => compare(ctx, date, out).await,
    Command::Totals(args) => totals(ctx, args, out).await,
    Command::Income(args) => income(ctx, args, out).await,
    Command::Breakeven(args) => breakeven_report(ctx, args, out).await,
    Command::Cost(cmd) => cost(ctx, cmd, out).await,
    Command::Inventory(cmd) => inventory(ctx, cmd, out).await,
    Command::Payroll(cmd) => payroll(ctx, cmd, out).await,
  }
}

fn emit<T: Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
  serde_json::to_writer_pretty(&mut *out, value)?;
  writeln!(out)?;
  Ok(())
}

// ─── Daily records ────────────────────────────────────────────────────────────

async fn submit<S: OperationsStore>(
  ctx: &Context<'_, S>,
  args: SubmitArgs,
  out: &mut impl Write,
) -> Result<()> {
  let date = args.date.unwrap_or_else(|| ctx.today());
  let entry = DailyEntry {
    morning_sales:     args.morning,
    afternoon_sales:   args.afternoon,
    evening_sales:     args.evening,
    guests_morning:    args.guests_morning,
    guests_afternoon:  args.guests_afternoon,
    guests_evening:    args.guests_evening,
    tickets_morning:   args.tickets_morning,
    tickets_afternoon: args.tickets_afternoon,
    tickets_evening:   args.tickets_evening,
    notes:             args.notes,
  };
  let written = ctx.store.put_record(entry.into_record(date)?, None).await?;

  if ctx.json {
    return emit(out, &written.record);
  }
  let verb = if written.replaced { "Replaced" } else { "Saved" };
  writeln!(
    out,
    "{verb} {date}: total {} ({} guests, {} tickets)",
    written.record.total_sales(),
    written.record.total_guests(),
    written.record.total_tickets(),
  )?;
  Ok(())
}

// ─── Reports ──────────────────────────────────────────────────────────────────

async fn compare<S: OperationsStore>(
  ctx: &Context<'_, S>,
  date: Option<NaiveDate>,
  out: &mut impl Write,
) -> Result<()> {
  let target = RequestContext::new(ctx.clock, date).target_date();
  let records = ctx.store.list_records().await?;
  let report = compare_day(target, &records);
  if ctx.json {
    return emit(out, &report);
  }
  write_comparison(out, &report)
}

fn write_comparison(out: &mut impl Write, report: &DayComparison) -> Result<()> {
  writeln!(out, "{} ({})", report.date, report.date.weekday())?;
  if !report.record_present {
    writeln!(out, "No figures recorded for this day.")?;
  }

  let comparable = &report.year_over_year.comparable;
  let heading = match (comparable.confidence, comparable.resolved_date) {
    (Confidence::Exact, Some(d)) => format!("Last year: {d} (exact)"),
    (Confidence::Approximate, Some(d)) => format!("Last year: {d} (approximate)"),
    _ => "Last year: no comparable day".to_owned(),
  };
  write_benchmark(out, &heading, &report.year_over_year.benchmark)?;

  let heading = match report.previous_day.sample_days {
    0 => "Previous day: not recorded".to_owned(),
    _ => "Previous day".to_owned(),
  };
  write_benchmark(out, &heading, &report.previous_day)?;

  let heading = format!(
    "{} average ({} days)",
    report.date.weekday(),
    report.weekday_average.sample_days
  );
  write_benchmark(out, &heading, &report.weekday_average)
}

fn variance_rows(v: &MetricVariances) -> [(&'static str, &Variance); 8] {
  [
    ("total sales", &v.total_sales),
    ("morning", &v.morning_sales),
    ("afternoon", &v.afternoon_sales),
    ("evening", &v.evening_sales),
    ("guests", &v.guests),
    ("tickets", &v.tickets),
    ("average ticket", &v.average_ticket),
    ("spend per guest", &v.per_guest_spend),
  ]
}

fn write_benchmark(out: &mut impl Write, heading: &str, benchmark: &Benchmark) -> Result<()> {
  writeln!(out)?;
  writeln!(out, "{heading}")?;
  writeln!(
    out,
    "  {:<16} {:>12} {:>12} {:>12} {:>8}  signal",
    "", "actual", "baseline", "diff", "%"
  )?;
  for (name, v) in variance_rows(&benchmark.variances) {
    writeln!(
      out,
      "  {name:<16} {:>12.2} {:>12.2} {:>+12.2} {:>+7.1}%  {:?}",
      v.actual, v.base, v.diff, v.percent, v.signal
    )?;
  }
  Ok(())
}

async fn totals<S: OperationsStore>(
  ctx: &Context<'_, S>,
  args: PeriodArgs,
  out: &mut impl Write,
) -> Result<()> {
  let period = ctx.period(args)?;
  let records = ctx.store.list_records().await?;
  let months = monthly_totals(&records, period);
  let overall = totals_for(&records, period);

  if ctx.json {
    #[derive(Serialize)]
    struct Report<'a> {
      period: Period,
      totals: PeriodTotals,
      months: &'a [MonthTotals],
    }
    return emit(out, &Report { period, totals: overall, months: &months });
  }
  writeln!(
    out,
    "{:<8} {:>5} {:>12} {:>8} {:>8} {:>10}",
    "month", "days", "sales", "guests", "tickets", "avg ticket"
  )?;
  for m in &months {
    let metrics = m.totals.metrics();
    writeln!(
      out,
      "{:<8} {:>5} {:>12} {:>8} {:>8} {:>10.2}",
      format!("{}-{:02}", m.year, m.month),
      m.totals.days,
      m.totals.total_sales(),
      m.totals.total_guests(),
      m.totals.total_tickets(),
      metrics.average_ticket,
    )?;
  }
  let metrics = overall.metrics();
  writeln!(
    out,
    "{:<8} {:>5} {:>12} {:>8} {:>8} {:>10.2}",
    period.to_string(),
    overall.days,
    overall.total_sales(),
    overall.total_guests(),
    overall.total_tickets(),
    metrics.average_ticket,
  )?;
  Ok(())
}

async fn income<S: OperationsStore>(
  ctx: &Context<'_, S>,
  args: PeriodArgs,
  out: &mut impl Write,
) -> Result<()> {
  let period = ctx.period(args)?;
  let ledgers = ctx.store.load_ledgers().await?;
  let statement = income_statement(period, &ledgers, ctx.statement);
  if ctx.json {
    return emit(out, &statement);
  }

  writeln!(
    out,
    "{:<8} {:>12} {:>12} {:>12} {:>7} {:>12} {:>12} {:>12}",
    "period", "sales", "cogs", "margin", "%", "labor", "opex", "ebitda"
  )?;
  for line in &statement.lines {
    write_income_line(out, line)?;
  }
  write_income_line(out, &statement.total)
}

fn write_income_line(out: &mut impl Write, line: &IncomeLine) -> Result<()> {
  writeln!(
    out,
    "{:<8} {:>12} {:>12} {:>12} {:>6.1}% {:>12} {:>12} {:>12}",
    line.period.to_string(),
    line.sales,
    line.cogs,
    line.gross_margin,
    line.gross_margin_pct,
    line.labor,
    line.operating_expenses,
    line.ebitda,
  )?;
  Ok(())
}

async fn breakeven_report<S: OperationsStore>(
  ctx: &Context<'_, S>,
  args: PeriodArgs,
  out: &mut impl Write,
) -> Result<()> {
  let period = ctx.period(args)?;
  let ledgers = ctx.store.load_ledgers().await?;
  let report = breakeven(period, &ledgers, ctx.statement);
  if ctx.json {
    return emit(out, &report);
  }

  writeln!(out, "Breakeven for {}", report.period)?;
  writeln!(out, "  sales         {:>12}", report.sales)?;
  writeln!(out, "  cogs          {:>12}", report.cogs)?;
  match report.margin_ratio {
    Some(r) => writeln!(out, "  margin ratio  {:>11.1}%", r * 100.0)?,
    None => writeln!(out, "  margin ratio  {:>12}", "n/a")?,
  }
  writeln!(out, "  fixed costs   {:>12}", report.fixed_costs)?;
  for line in &report.breakdown {
    writeln!(out, "    {:<20} {:>12}", line.category, line.amount)?;
  }
  match report.breakeven_sales {
    Some(b) => writeln!(out, "  breakeven     {:>12}", b)?,
    None => writeln!(out, "  breakeven     {:>12}", "n/a")?,
  }
  if let Some(daily) = report.daily_breakeven {
    writeln!(out, "  per day       {:>12}", daily)?;
  }
  Ok(())
}

// ─── Ledgers ──────────────────────────────────────────────────────────────────

async fn cost<S: OperationsStore>(
  ctx: &Context<'_, S>,
  command: CostCommand,
  out: &mut impl Write,
) -> Result<()> {
  match command {
    CostCommand::Add { date, source, category, amount, description, fixed } => {
      let entry = ctx
        .store
        .add_cost(NewCostEntry {
          date: date.unwrap_or_else(|| ctx.today()),
          source,
          category,
          description,
          amount,
          fixed,
        })
        .await?;
      if ctx.json {
        return emit(out, &entry);
      }
      writeln!(
        out,
        "Added {} {} on {} ({})",
        entry.source, entry.amount, entry.date, entry.id
      )?;
    }
    CostCommand::List { year, month, source } => {
      let filter = CostFilter { year, month, source };
      let mut costs = ctx.store.list_costs().await?;
      costs.retain(|c| filter.matches(c));
      if ctx.json {
        return emit(out, &costs);
      }
      for c in &costs {
        writeln!(
          out,
          "{}  {}  {:<9} {:<16} {:>10}{}  {}",
          c.id,
          c.date,
          c.source.as_str(),
          c.category,
          c.amount,
          if c.fixed { " fixed" } else { "" },
          c.description,
        )?;
      }
    }
    CostCommand::Delete { id } => {
      if !ctx.store.delete_cost(id).await? {
        bail!("no cost entry with id {id}");
      }
      writeln!(out, "Deleted cost entry {id}")?;
    }
  }
  Ok(())
}

async fn inventory<S: OperationsStore>(
  ctx: &Context<'_, S>,
  command: InventoryCommand,
  out: &mut impl Write,
) -> Result<()> {
  match command {
    InventoryCommand::Set { year, month, value, updated_on } => {
      let snapshot = InventorySnapshot::new(
        year,
        month,
        value,
        updated_on.unwrap_or_else(|| ctx.today()),
      )?;
      let replaced = ctx.store.put_inventory(snapshot.clone()).await?;
      if ctx.json {
        return emit(out, &snapshot);
      }
      let verb = if replaced { "Replaced" } else { "Saved" };
      writeln!(out, "{verb} closing stock for {year}-{month:02}: {value}")?;
    }
    InventoryCommand::List => {
      let snapshots = ctx.store.list_inventory().await?;
      let movements = stock_movements(&snapshots);
      if ctx.json {
        return emit(out, &movements);
      }
      for m in &movements {
        writeln!(
          out,
          "{}-{:02}  {:>12}  change {:>12}  counted {}",
          m.snapshot.year,
          m.snapshot.month,
          m.snapshot.closing_value,
          m.change,
          m.snapshot.updated_on,
        )?;
      }
    }
  }
  Ok(())
}

fn headcount_by_month(counts: &[u32]) -> Result<[u32; 12]> {
  match counts {
    [n] => Ok([*n; 12]),
    _ => match <[u32; 12]>::try_from(counts) {
      Ok(months) => Ok(months),
      Err(_) => bail!("headcount needs 1 or 12 values, got {}", counts.len()),
    },
  }
}

async fn payroll<S: OperationsStore>(
  ctx: &Context<'_, S>,
  command: PayrollCommand,
  out: &mut impl Write,
) -> Result<()> {
  let rate = ctx.statement.social_security_rate;
  match command {
    PayrollCommand::Add { year, title, annual_gross, headcount, structural } => {
      let position = ctx
        .store
        .add_payroll(NewPayrollPosition {
          year,
          title,
          annual_gross,
          headcount: headcount_by_month(&headcount)?,
          structural,
        })
        .await?;
      if ctx.json {
        return emit(out, &position);
      }
      writeln!(out, "Added {} for {} ({})", position.title, position.year, position.id)?;
    }
    PayrollCommand::List { year } => {
      let mut positions = ctx.store.list_payroll().await?;
      positions.retain(|p| year.is_none_or(|y| p.year == y));
      if ctx.json {
        return emit(out, &positions);
      }
      for p in &positions {
        let annual = payroll_cost(
          std::slice::from_ref(p),
          Period::year(p.year),
          rate,
          false,
        );
        writeln!(
          out,
          "{}  {}  {:<20} {:>12} gross {:>12} employer{}",
          p.id,
          p.year,
          p.title,
          annual.gross,
          annual.employer_cost,
          if p.structural { "  structural" } else { "" },
        )?;
      }
    }
    PayrollCommand::Delete { id } => {
      if !ctx.store.delete_payroll(id).await? {
        bail!("no payroll position with id {id}");
      }
      writeln!(out, "Deleted payroll position {id}")?;
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use oyken_core::{Cents, clock::FixedClock, ledger::CostSource};
  use oyken_store_csv::CsvStore;
  use tempfile::TempDir;

  use super::*;

  async fn store() -> (TempDir, CsvStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::open(dir.path()).await.unwrap();
    (dir, store)
  }

  fn day(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

  async fn exec(store: &CsvStore, json: bool, command: Command) -> Result<String> {
    let config = StatementConfig::default();
    let clock = FixedClock(day(2025, 1, 13));
    let ctx = Context { store, clock: &clock, statement: &config, json };
    let mut out = Vec::new();
    run(&ctx, command, &mut out).await?;
    Ok(String::from_utf8(out).unwrap())
  }

  fn submit_cmd(date: Option<NaiveDate>, morning: i64) -> Command {
    Command::Submit(SubmitArgs {
      date,
      morning: Cents(morning),
      afternoon: Cents::ZERO,
      evening: Cents::ZERO,
      guests_morning: 0,
      guests_afternoon: 0,
      guests_evening: 0,
      tickets_morning: 2,
      tickets_afternoon: 0,
      tickets_evening: 0,
      notes: "  rainy  ".into(),
    })
  }

  #[tokio::test]
  async fn submit_defaults_to_today_and_reports_replacement() {
    let (_dir, s) = store().await;
    let first = exec(&s, false, submit_cmd(None, 10_000)).await.unwrap();
    assert_eq!(first, "Saved 2025-01-13: total 100.00 (0 guests, 2 tickets)\n");
    let again = exec(&s, false, submit_cmd(None, 20_000)).await.unwrap();
    assert!(again.starts_with("Replaced 2025-01-13"));

    let stored = s.get_record(day(2025, 1, 13)).await.unwrap().unwrap();
    assert_eq!(stored.morning_sales, Cents(20_000));
    assert_eq!(stored.notes, "rainy");
  }

  #[tokio::test]
  async fn negative_sales_are_rejected() {
    let (_dir, s) = store().await;
    let err = exec(&s, false, submit_cmd(None, -1)).await.unwrap_err();
    assert!(err.to_string().contains("must not be negative"));
    assert!(s.list_records().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn compare_json_resolves_last_year() {
    let (_dir, s) = store().await;
    exec(&s, false, submit_cmd(Some(day(2024, 1, 8)), 100_000)).await.unwrap();
    exec(&s, false, submit_cmd(None, 120_000)).await.unwrap();

    let text = exec(&s, true, Command::Compare { date: None }).await.unwrap();
    let report: serde_json::Value = serde_json::from_str(&text).unwrap();
    let yoy = &report["year_over_year"];
    assert_eq!(yoy["comparable"]["confidence"], "approximate");
    let total = &yoy["benchmark"]["variances"]["total_sales"];
    assert_eq!(total["diff"], 200.0);
    assert_eq!(total["percent"], 20.0);
    assert_eq!(total["signal"], "rise");
  }

  #[tokio::test]
  async fn compare_text_without_history() {
    let (_dir, s) = store().await;
    let text = exec(&s, false, Command::Compare { date: Some(day(2025, 3, 3)) })
      .await
      .unwrap();
    assert!(text.starts_with("2025-03-03 (Mon)"));
    assert!(text.contains("No figures recorded"));
    assert!(text.contains("Last year: no comparable day"));
    assert!(text.contains("Previous day: not recorded"));
  }

  #[tokio::test]
  async fn invalid_month_is_an_error() {
    let (_dir, s) = store().await;
    let args = PeriodArgs { year: None, month: Some(13) };
    assert!(exec(&s, false, Command::Totals(args)).await.is_err());
  }

  #[tokio::test]
  async fn cost_add_list_delete() {
    let (_dir, s) = store().await;
    let add = Command::Cost(CostCommand::Add {
      date:        None,
      source:      CostSource::Expense,
      category:    "Rent".into(),
      amount:      Cents(150_000),
      description: String::new(),
      fixed:       true,
    });
    let text = exec(&s, true, add).await.unwrap();
    let entry: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(entry["date"], "2025-01-13");
    let id: uuid::Uuid = entry["id"].as_str().unwrap().parse().unwrap();

    let list = Command::Cost(CostCommand::List { year: Some(2025), month: None, source: None });
    let text = exec(&s, false, list).await.unwrap();
    assert!(text.contains("Rent"));
    assert!(text.contains("1500.00 fixed"));

    let breakeven = exec(&s, true, Command::Breakeven(PeriodArgs { year: None, month: Some(1) }))
      .await
      .unwrap();
    let report: serde_json::Value = serde_json::from_str(&breakeven).unwrap();
    assert_eq!(report["fixed_costs"], 1500.0);

    exec(&s, false, Command::Cost(CostCommand::Delete { id })).await.unwrap();
    let err = exec(&s, false, Command::Cost(CostCommand::Delete { id })).await.unwrap_err();
    assert!(err.to_string().contains("no cost entry"));
  }

  #[tokio::test]
  async fn inventory_set_then_list_shows_change() {
    let (_dir, s) = store().await;
    for (month, value) in [(1, 100_000), (2, 80_000)] {
      let cmd = Command::Inventory(InventoryCommand::Set {
        year: 2025,
        month,
        value: Cents(value),
        updated_on: None,
      });
      exec(&s, false, cmd).await.unwrap();
    }
    let text = exec(&s, false, Command::Inventory(InventoryCommand::List)).await.unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("2025-02"));
    assert!(lines[1].contains("-200.00"));
  }

  #[tokio::test]
  async fn payroll_single_headcount_fills_year() {
    let (_dir, s) = store().await;
    let add = Command::Payroll(PayrollCommand::Add {
      year:         2025,
      title:        "Cook".into(),
      annual_gross: Cents(2_400_000),
      headcount:    vec![2],
      structural:   true,
    });
    exec(&s, false, add).await.unwrap();

    let positions = s.list_payroll().await.unwrap();
    assert_eq!(positions[0].headcount, [2; 12]);

    let text = exec(&s, false, Command::Payroll(PayrollCommand::List { year: Some(2025) }))
      .await
      .unwrap();
    // 2 heads x 24000 gross, plus 33 % employer social security.
    assert!(text.contains("48000.00 gross"));
    assert!(text.contains("63840.00 employer"));
    assert!(text.contains("structural"));
  }

  #[test]
  fn headcount_needs_one_or_twelve_values() {
    assert_eq!(headcount_by_month(&[3]).unwrap(), [3; 12]);
    assert_eq!(headcount_by_month(&[1; 12]).unwrap(), [1; 12]);
    assert!(headcount_by_month(&[1, 2]).is_err());
  }
}
