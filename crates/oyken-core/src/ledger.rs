//! Cost, inventory and payroll ledgers feeding the financial statements.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Cents, Error, Result, calendar::Period};

// ─── Costs ───────────────────────────────────────────────────────────────────

/// Which book a cost entry belongs to.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CostSource {
  /// Goods bought for resale or transformation.
  Purchase,
  /// Goods lost, spoiled or given away.
  Shrinkage,
  /// Operating expenses (rent, utilities, services).
  Expense,
}

impl CostSource {
  pub const ALL: [CostSource; 3] =
    [CostSource::Purchase, CostSource::Shrinkage, CostSource::Expense];

  pub fn as_str(self) -> &'static str {
    match self {
      CostSource::Purchase => "purchase",
      CostSource::Shrinkage => "shrinkage",
      CostSource::Expense => "expense",
    }
  }
}

impl fmt::Display for CostSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for CostSource {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let wanted = s.trim().to_ascii_lowercase();
    CostSource::ALL
      .into_iter()
      .find(|source| source.as_str() == wanted)
      .ok_or_else(|| Error::UnknownCostSource(s.to_owned()))
  }
}

/// A single purchase, shrinkage or expense line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostEntry {
  pub id:          Uuid,
  pub date:        NaiveDate,
  pub source:      CostSource,
  pub category:    String,
  #[serde(default)]
  pub description: String,
  pub amount:      Cents,
  /// Counted as a fixed structural cost for breakeven purposes.
  #[serde(default)]
  pub fixed:       bool,
}

/// A cost entry before the store assigns it an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCostEntry {
  pub date:        NaiveDate,
  pub source:      CostSource,
  pub category:    String,
  #[serde(default)]
  pub description: String,
  pub amount:      Cents,
  #[serde(default)]
  pub fixed:       bool,
}

impl NewCostEntry {
  pub fn into_entry(self, id: Uuid) -> Result<CostEntry> {
    if !self.amount.is_positive() {
      return Err(Error::InvalidEntry(format!(
        "cost amount must be greater than zero (got {})",
        self.amount
      )));
    }
    let category = self.category.trim();
    if category.is_empty() {
      return Err(Error::InvalidEntry("cost category must not be empty".into()));
    }
    Ok(CostEntry {
      id,
      date: self.date,
      source: self.source,
      category: category.to_owned(),
      description: self.description.trim().to_owned(),
      amount: self.amount,
      fixed: self.fixed,
    })
  }
}

/// Filter for listing cost entries.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CostFilter {
  pub year:   Option<i32>,
  pub month:  Option<u32>,
  pub source: Option<CostSource>,
}

impl CostFilter {
  pub fn matches(&self, entry: &CostEntry) -> bool {
    self.year.is_none_or(|y| entry.date.year() == y)
      && self.month.is_none_or(|m| entry.date.month() == m)
      && self.source.is_none_or(|s| entry.source == s)
  }
}

/// Sum of entries from `source` dated within `period`.
pub fn total_by_source(
  entries: &[CostEntry],
  source: CostSource,
  period: Period,
) -> Cents {
  entries
    .iter()
    .filter(|e| e.source == source && period.contains(e.date))
    .map(|e| e.amount)
    .sum()
}

// ─── Inventory ───────────────────────────────────────────────────────────────

/// Closing stock valuation at the end of a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
  pub year:          i32,
  pub month:         u32,
  pub closing_value: Cents,
  pub updated_on:    NaiveDate,
}

impl InventorySnapshot {
  pub fn new(
    year: i32,
    month: u32,
    closing_value: Cents,
    updated_on: NaiveDate,
  ) -> Result<Self> {
    Period::new(year, Some(month))?;
    if closing_value.is_negative() {
      return Err(Error::InvalidEntry(format!(
        "closing stock value must not be negative (got {closing_value})"
      )));
    }
    Ok(Self {
      year,
      month,
      closing_value,
      updated_on,
    })
  }

  pub fn key(&self) -> (i32, u32) { (self.year, self.month) }
}

/// A snapshot together with the change against the one before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
  #[serde(flatten)]
  pub snapshot:       InventorySnapshot,
  pub previous_value: Option<Cents>,
  /// Closing value minus the previous closing value; zero for the first
  /// snapshot.
  pub change:         Cents,
}

/// Collapse snapshots sharing a `(year, month)`, keeping the last, ordered
/// chronologically.
pub fn dedupe_snapshots(
  snapshots: impl IntoIterator<Item = InventorySnapshot>,
) -> Vec<InventorySnapshot> {
  let mut by_month = BTreeMap::new();
  for snapshot in snapshots {
    by_month.insert(snapshot.key(), snapshot);
  }
  by_month.into_values().collect()
}

/// Chronological stock movements of a snapshot set.
pub fn stock_movements(snapshots: &[InventorySnapshot]) -> Vec<StockMovement> {
  let ordered = dedupe_snapshots(snapshots.iter().cloned());
  let mut previous: Option<Cents> = None;
  ordered
    .into_iter()
    .map(|snapshot| {
      let change = previous
        .map(|p| snapshot.closing_value - p)
        .unwrap_or(Cents::ZERO);
      let movement = StockMovement {
        previous_value: previous,
        change,
        snapshot,
      };
      previous = Some(movement.snapshot.closing_value);
      movement
    })
    .collect()
}

/// Net stock change recorded for months within `period`.
pub fn stock_change(snapshots: &[InventorySnapshot], period: Period) -> Cents {
  stock_movements(snapshots)
    .iter()
    .filter(|m| {
      m.snapshot.year == period.year
        && period.months().contains(&m.snapshot.month)
    })
    .map(|m| m.change)
    .sum()
}

// ─── Payroll ─────────────────────────────────────────────────────────────────

/// A job position and how many people fill it each month of `year`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPosition {
  pub id:           Uuid,
  pub year:         i32,
  pub title:        String,
  /// Gross annual salary of one person in the position.
  pub annual_gross: Cents,
  /// Headcount for January through December.
  pub headcount:    [u32; 12],
  /// Part of the minimum staff the business cannot operate without.
  #[serde(default)]
  pub structural:   bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayrollPosition {
  pub year:         i32,
  pub title:        String,
  pub annual_gross: Cents,
  #[serde(default)]
  pub headcount:    [u32; 12],
  #[serde(default)]
  pub structural:   bool,
}

impl NewPayrollPosition {
  pub fn into_position(self, id: Uuid) -> Result<PayrollPosition> {
    let title = self.title.trim();
    if title.is_empty() {
      return Err(Error::InvalidEntry("position title must not be empty".into()));
    }
    if self.annual_gross.is_negative() {
      return Err(Error::InvalidEntry(format!(
        "annual gross must not be negative (got {})",
        self.annual_gross
      )));
    }
    Ok(PayrollPosition {
      id,
      year: self.year,
      title: title.to_owned(),
      annual_gross: self.annual_gross,
      headcount: self.headcount,
      structural: self.structural,
    })
  }
}

/// Employer-side cost of a position in one month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollCost {
  pub gross:           Cents,
  pub social_security: Cents,
  pub employer_cost:   Cents,
}

impl std::ops::Add for PayrollCost {
  type Output = PayrollCost;

  fn add(self, rhs: PayrollCost) -> PayrollCost {
    PayrollCost {
      gross:           self.gross + rhs.gross,
      social_security: self.social_security + rhs.social_security,
      employer_cost:   self.employer_cost + rhs.employer_cost,
    }
  }
}

impl std::iter::Sum for PayrollCost {
  fn sum<I: Iterator<Item = PayrollCost>>(iter: I) -> PayrollCost {
    iter.fold(PayrollCost::default(), std::ops::Add::add)
  }
}

impl PayrollPosition {
  /// Cost of the position in `month` (1–12); zero outside that range.
  pub fn monthly_cost(&self, month: u32, social_security_rate: f64) -> PayrollCost {
    let heads = month
      .checked_sub(1)
      .and_then(|i| self.headcount.get(i as usize))
      .copied()
      .unwrap_or(0);
    let gross = Cents::round_from(self.annual_gross.0 as f64 * f64::from(heads) / 12.0);
    let social_security = gross.scale(social_security_rate);
    PayrollCost {
      gross,
      social_security,
      employer_cost: gross + social_security,
    }
  }
}

/// Total payroll cost of `positions` over `period`. With `structural_only`
/// only positions flagged structural count.
pub fn payroll_cost(
  positions: &[PayrollPosition],
  period: Period,
  social_security_rate: f64,
  structural_only: bool,
) -> PayrollCost {
  positions
    .iter()
    .filter(|p| p.year == period.year && (p.structural || !structural_only))
    .flat_map(|p| period.months().map(move |m| p.monthly_cost(m, social_security_rate)))
    .sum()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn snapshot(year: i32, month: u32, value: i64) -> InventorySnapshot {
    InventorySnapshot::new(year, month, Cents(value), day(year, month, 1)).unwrap()
  }

  #[test]
  fn cost_source_parses_case_insensitively() {
    assert_eq!("Purchase".parse::<CostSource>().unwrap(), CostSource::Purchase);
    assert_eq!(" expense ".parse::<CostSource>().unwrap(), CostSource::Expense);
    assert!(matches!(
      "refund".parse::<CostSource>(),
      Err(Error::UnknownCostSource(_))
    ));
  }

  #[test]
  fn non_positive_cost_is_rejected() {
    let entry = NewCostEntry {
      date:        day(2025, 1, 2),
      source:      CostSource::Purchase,
      category:    "Food".into(),
      description: String::new(),
      amount:      Cents::ZERO,
      fixed:       false,
    };
    assert!(entry.clone().into_entry(Uuid::new_v4()).is_err());
    let ok = NewCostEntry {
      amount: Cents(1),
      ..entry
    }
    .into_entry(Uuid::new_v4())
    .unwrap();
    assert_eq!(ok.category, "Food");
  }

  #[test]
  fn stock_movements_chain_snapshots() {
    let moves = stock_movements(&[
      snapshot(2025, 2, 12_000),
      snapshot(2025, 1, 10_000),
      snapshot(2025, 3, 9_000),
    ]);
    assert_eq!(moves[0].change, Cents::ZERO);
    assert_eq!(moves[0].previous_value, None);
    assert_eq!(moves[1].change, Cents(2_000));
    assert_eq!(moves[2].change, Cents(-3_000));
  }

  #[test]
  fn stock_change_over_a_year() {
    let snaps = [
      snapshot(2024, 12, 5_000),
      snapshot(2025, 1, 10_000),
      snapshot(2025, 3, 9_000),
    ];
    assert_eq!(stock_change(&snaps, Period::month(2025, 1)), Cents(5_000));
    assert_eq!(stock_change(&snaps, Period::year(2025)), Cents(4_000));
  }

  #[test]
  fn snapshot_month_is_validated() {
    assert!(InventorySnapshot::new(2025, 13, Cents(1), day(2025, 1, 1)).is_err());
  }

  #[test]
  fn payroll_monthly_buildup() {
    let mut headcount = [1; 12];
    headcount[7] = 2;
    let position = NewPayrollPosition {
      year: 2025,
      title: "Cook".into(),
      annual_gross: Cents(2_400_000),
      headcount,
      structural: true,
    }
    .into_position(Uuid::new_v4())
    .unwrap();

    let jan = position.monthly_cost(1, 0.33);
    assert_eq!(jan.gross, Cents(200_000));
    assert_eq!(jan.social_security, Cents(66_000));
    assert_eq!(jan.employer_cost, Cents(266_000));
    assert_eq!(position.monthly_cost(8, 0.0).gross, Cents(400_000));
    assert_eq!(position.monthly_cost(13, 0.33), PayrollCost::default());

    let year = payroll_cost(&[position], Period::year(2025), 0.0, true);
    assert_eq!(year.gross, Cents(2_600_000));
  }
}
