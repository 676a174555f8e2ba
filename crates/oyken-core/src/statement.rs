//! Income statement, EBITDA and breakeven, built from the daily records and
//! the cost, inventory and payroll ledgers.
//!
//! Every report goes through the same path parametrised by
//! [`StatementConfig`]; there is no per-report variant of the arithmetic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  Cents,
  aggregate::totals_for,
  calendar::Period,
  ledger::{
    CostEntry, CostSource, InventorySnapshot, PayrollPosition, payroll_cost,
    stock_change, total_by_source,
  },
  record::DailyRecord,
};

/// Category under which structural payroll appears in the fixed-cost
/// breakdown.
pub const STRUCTURAL_PAYROLL: &str = "Structural payroll";

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementConfig {
  /// Cost sources that make up the cost of goods sold. Everything else is an
  /// operating expense.
  pub cogs_sources:             Vec<CostSource>,
  /// Subtract the stock change from COGS.
  pub include_inventory_change: bool,
  /// Expense categories treated as fixed even when entries are not flagged.
  pub fixed_categories:         Vec<String>,
  /// Employer social security as a fraction of gross pay.
  pub social_security_rate:     f64,
}

impl Default for StatementConfig {
  fn default() -> Self {
    Self {
      cogs_sources:             vec![CostSource::Purchase, CostSource::Shrinkage],
      include_inventory_change: true,
      fixed_categories:         Vec::new(),
      social_security_rate:     0.33,
    }
  }
}

impl StatementConfig {
  fn is_cogs(&self, source: CostSource) -> bool { self.cogs_sources.contains(&source) }

  fn is_fixed(&self, entry: &CostEntry) -> bool {
    entry.source == CostSource::Expense
      && (entry.fixed
        || self
          .fixed_categories
          .iter()
          .any(|c| c.trim().eq_ignore_ascii_case(entry.category.trim())))
  }
}

/// Everything a statement is computed from.
#[derive(Debug, Clone, Default)]
pub struct Ledgers {
  pub records:   Vec<DailyRecord>,
  pub costs:     Vec<CostEntry>,
  pub inventory: Vec<InventorySnapshot>,
  pub payroll:   Vec<PayrollPosition>,
}

// ─── Income statement ────────────────────────────────────────────────────────

/// One column of the income statement: a month, or the whole period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeLine {
  pub period:             Period,
  pub sales:              Cents,
  pub purchases:          Cents,
  pub shrinkage:          Cents,
  /// Closing stock minus the previous closing stock.
  pub stock_change:       Cents,
  pub cogs:               Cents,
  pub gross_margin:       Cents,
  pub gross_margin_pct:   f64,
  pub labor:              Cents,
  pub operating_expenses: Cents,
  pub ebitda:             Cents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatement {
  pub period: Period,
  pub lines:  Vec<IncomeLine>,
  pub total:  IncomeLine,
}

fn income_line(period: Period, ledgers: &Ledgers, config: &StatementConfig) -> IncomeLine {
  let sales = totals_for(&ledgers.records, period).total_sales();
  let by_source = |source: CostSource| total_by_source(&ledgers.costs, source, period);

  let stock = if config.include_inventory_change {
    stock_change(&ledgers.inventory, period)
  } else {
    Cents::ZERO
  };

  let (cogs_sources, opex_sources): (Vec<_>, Vec<_>) =
    CostSource::ALL.into_iter().partition(|s| config.is_cogs(*s));
  let cogs = cogs_sources.into_iter().map(by_source).sum::<Cents>() + stock;
  let operating_expenses: Cents = opex_sources.into_iter().map(by_source).sum();

  let gross_margin = sales - cogs;
  let gross_margin_pct = if sales.is_positive() {
    gross_margin.0 as f64 * 100.0 / sales.0 as f64
  } else {
    0.0
  };
  let labor =
    payroll_cost(&ledgers.payroll, period, config.social_security_rate, false)
      .employer_cost;

  IncomeLine {
    period,
    sales,
    purchases: by_source(CostSource::Purchase),
    shrinkage: by_source(CostSource::Shrinkage),
    stock_change: stock,
    cogs,
    gross_margin,
    gross_margin_pct,
    labor,
    operating_expenses,
    ebitda: gross_margin - labor - operating_expenses,
  }
}

/// Income statement for `period`: one line per month plus the total.
pub fn income_statement(
  period: Period,
  ledgers: &Ledgers,
  config: &StatementConfig,
) -> IncomeStatement {
  let lines = period
    .months()
    .map(|m| income_line(Period::month(period.year, m), ledgers, config))
    .collect();
  IncomeStatement {
    period,
    lines,
    total: income_line(period, ledgers, config),
  }
}

// ─── Breakeven ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedCostLine {
  pub category: String,
  pub amount:   Cents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakeven {
  pub period:          Period,
  pub sales:           Cents,
  pub cogs:            Cents,
  /// `1 - cogs / sales`; absent without sales.
  pub margin_ratio:    Option<f64>,
  pub fixed_costs:     Cents,
  pub breakdown:       Vec<FixedCostLine>,
  /// Sales needed for the gross margin to cover fixed costs; absent when the
  /// margin is not positive.
  pub breakeven_sales: Option<Cents>,
  /// Breakeven spread over the days of a single-month period.
  pub daily_breakeven: Option<Cents>,
}

pub fn breakeven(
  period: Period,
  ledgers: &Ledgers,
  config: &StatementConfig,
) -> Breakeven {
  let line = income_line(period, ledgers, config);

  let margin_ratio = line
    .sales
    .is_positive()
    .then(|| 1.0 - line.cogs.0 as f64 / line.sales.0 as f64);

  let mut by_category: BTreeMap<String, Cents> = BTreeMap::new();
  for entry in ledgers
    .costs
    .iter()
    .filter(|e| period.contains(e.date) && config.is_fixed(e))
  {
    *by_category.entry(entry.category.clone()).or_default() += entry.amount;
  }

  let structural =
    payroll_cost(&ledgers.payroll, period, config.social_security_rate, true)
      .employer_cost;
  let breakdown: Vec<FixedCostLine> = std::iter::once(FixedCostLine {
    category: STRUCTURAL_PAYROLL.to_owned(),
    amount:   structural,
  })
  .chain(
    by_category
      .into_iter()
      .map(|(category, amount)| FixedCostLine { category, amount }),
  )
  .collect();
  let fixed_costs = breakdown.iter().map(|l| l.amount).sum::<Cents>();

  let breakeven_units = margin_ratio
    .filter(|r| *r > 0.0)
    .map(|r| fixed_costs.0 as f64 / r);
  let daily_breakeven = period.month.and(breakeven_units).and_then(|total| {
    let days = period.days();
    (days > 0).then(|| Cents::round_from(total / f64::from(days)))
  });

  Breakeven {
    period,
    sales: line.sales,
    cogs: line.cogs,
    margin_ratio,
    fixed_costs,
    breakdown,
    breakeven_sales: breakeven_units.map(Cents::round_from),
    daily_breakeven,
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use uuid::Uuid;

  use super::*;

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn cost(
    date: NaiveDate,
    source: CostSource,
    category: &str,
    amount: i64,
    fixed: bool,
  ) -> CostEntry {
    CostEntry {
      id: Uuid::new_v4(),
      date,
      source,
      category: category.into(),
      description: String::new(),
      amount: Cents(amount),
      fixed,
    }
  }

  fn fixture() -> Ledgers {
    let mut headcount = [0; 12];
    headcount[0] = 1;
    Ledgers {
      records:   vec![DailyRecord {
        evening_sales: Cents(1_000_000),
        ..DailyRecord::empty(day(2025, 1, 10))
      }],
      costs:     vec![
        cost(day(2025, 1, 3), CostSource::Purchase, "Food", 300_000, false),
        cost(day(2025, 1, 4), CostSource::Shrinkage, "Food", 20_000, false),
        cost(day(2025, 1, 1), CostSource::Expense, "Rent", 150_000, true),
        cost(day(2025, 1, 5), CostSource::Expense, "Utilities", 30_000, false),
        cost(day(2025, 1, 6), CostSource::Expense, "Insurance", 20_000, false),
        // Outside the period.
        cost(day(2025, 2, 1), CostSource::Expense, "Rent", 150_000, true),
      ],
      inventory: vec![
        InventorySnapshot::new(2024, 12, Cents(50_000), day(2024, 12, 31)).unwrap(),
        InventorySnapshot::new(2025, 1, Cents(70_000), day(2025, 1, 31)).unwrap(),
      ],
      payroll:   vec![PayrollPosition {
        id: Uuid::new_v4(),
        year: 2025,
        title: "Cook".into(),
        annual_gross: Cents(2_400_000),
        headcount,
        structural: true,
      }],
    }
  }

  fn config() -> StatementConfig {
    StatementConfig {
      fixed_categories: vec!["insurance".into()],
      ..StatementConfig::default()
    }
  }

  #[test]
  fn income_statement_for_one_month() {
    let statement = income_statement(Period::month(2025, 1), &fixture(), &config());
    assert_eq!(statement.lines.len(), 1);
    let t = &statement.total;
    assert_eq!(t.sales, Cents(1_000_000));
    assert_eq!(t.stock_change, Cents(20_000));
    assert_eq!(t.cogs, Cents(340_000));
    assert_eq!(t.gross_margin, Cents(660_000));
    assert_eq!(t.gross_margin_pct, 66.0);
    assert_eq!(t.labor, Cents(266_000));
    assert_eq!(t.operating_expenses, Cents(200_000));
    assert_eq!(t.ebitda, Cents(194_000));
  }

  #[test]
  fn yearly_statement_has_twelve_lines() {
    let statement = income_statement(Period::year(2025), &fixture(), &config());
    assert_eq!(statement.lines.len(), 12);
    assert_eq!(statement.total.operating_expenses, Cents(350_000));
    assert_eq!(statement.lines[1].sales, Cents::ZERO);
    assert_eq!(statement.lines[1].gross_margin_pct, 0.0);
  }

  #[test]
  fn inventory_change_can_be_ignored() {
    let cfg = StatementConfig {
      include_inventory_change: false,
      ..config()
    };
    let t = income_statement(Period::month(2025, 1), &fixture(), &cfg).total;
    assert_eq!(t.stock_change, Cents::ZERO);
    assert_eq!(t.cogs, Cents(320_000));
  }

  #[test]
  fn breakeven_for_one_month() {
    let b = breakeven(Period::month(2025, 1), &fixture(), &config());
    assert!((b.margin_ratio.unwrap() - 0.66).abs() < 1e-9);
    assert_eq!(b.fixed_costs, Cents(436_000));
    assert_eq!(b.breakdown[0].category, STRUCTURAL_PAYROLL);
    assert_eq!(b.breakdown[0].amount, Cents(266_000));
    assert_eq!(b.breakdown.len(), 3);
    assert_eq!(b.breakeven_sales, Some(Cents(660_606)));
    assert_eq!(b.daily_breakeven, Some(Cents(21_310)));
  }

  #[test]
  fn inventory_variation_follows_the_closing_stock() {
    let purchases = |amount| Ledgers {
      costs: vec![cost(day(2025, 1, 3), CostSource::Purchase, "Food", amount, false)],
      ..Ledgers::default()
    };
    let snapshots = |closing| {
      vec![
        InventorySnapshot::new(2024, 12, Cents(50_000), day(2024, 12, 31)).unwrap(),
        InventorySnapshot::new(2025, 1, Cents(closing), day(2025, 1, 31)).unwrap(),
      ]
    };

    // Stock grew by 200.00.
    let grown = Ledgers { inventory: snapshots(70_000), ..purchases(300_000) };
    let t = income_statement(Period::month(2025, 1), &grown, &StatementConfig::default()).total;
    assert_eq!(t.stock_change, Cents(20_000));
    assert_eq!(t.cogs, Cents(320_000));

    // Stock shrank by 200.00.
    let shrunk = Ledgers { inventory: snapshots(30_000), ..purchases(300_000) };
    let t = income_statement(Period::month(2025, 1), &shrunk, &StatementConfig::default()).total;
    assert_eq!(t.stock_change, Cents(-20_000));
    assert_eq!(t.cogs, Cents(280_000));
  }

  #[test]
  fn breakeven_without_sales() {
    let b = breakeven(Period::month(2025, 3), &fixture(), &config());
    assert_eq!(b.margin_ratio, None);
    assert_eq!(b.breakeven_sales, None);
    assert_eq!(b.daily_breakeven, None);
  }

  #[test]
  fn yearly_breakeven_has_no_daily_figure() {
    let b = breakeven(Period::year(2025), &fixture(), &config());
    assert!(b.breakeven_sales.is_some());
    assert_eq!(b.daily_breakeven, None);
  }
}
