//! Conversion between CSV rows and domain types.
//!
//! Key columns (dates, ids, year/month) must parse or the table is reported
//! as corrupt. Every other cell is coerced: a value that does not parse reads
//! as zero (or empty, or `false`) and a warning is logged, but the row is kept.

use std::str::FromStr;

use chrono::NaiveDate;
use csv::StringRecord;
use oyken_core::{
  Cents,
  ledger::{CostEntry, CostSource, InventorySnapshot, PayrollPosition},
  record::DailyRecord,
};
use uuid::Uuid;

use crate::{
  Error, Result,
  schema::{COSTS, DAILY_SALES, INVENTORY, PAYROLL, Table, headcount_column},
};

// ─── Row access ──────────────────────────────────────────────────────────────

/// One data row, with cells addressed by header name.
pub struct Row<'a> {
  pub table:   &'static Table,
  pub line:    u64,
  pub headers: &'a StringRecord,
  pub record:  &'a StringRecord,
}

impl Row<'_> {
  /// Trimmed cell for `column`; empty when the column is absent.
  pub fn get(&self, column: &str) -> &str {
    self
      .headers
      .iter()
      .position(|h| h.trim() == column)
      .and_then(|i| self.record.get(i))
      .map(str::trim)
      .unwrap_or("")
  }

  pub fn corrupt(&self, reason: impl Into<String>) -> Error {
    Error::Corrupt {
      file:   self.table.file.to_owned(),
      row:    self.line,
      reason: reason.into(),
    }
  }

  fn coerced(&self, column: &str, value: &str) {
    tracing::warn!(
      file = self.table.file,
      line = self.line,
      column,
      value,
      "unparseable value read as default"
    );
  }

  fn date(&self, column: &str) -> Result<NaiveDate> {
    let raw = self.get(column);
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
      .map_err(|e| self.corrupt(format!("invalid {column} {raw:?}: {e}")))
  }

  fn key<T: FromStr>(&self, column: &str) -> Result<T>
  where
    T::Err: std::fmt::Display,
  {
    let raw = self.get(column);
    raw
      .parse()
      .map_err(|e| self.corrupt(format!("invalid {column} {raw:?}: {e}")))
  }

  fn money(&self, column: &str) -> Cents {
    let raw = self.get(column);
    if raw.is_empty() {
      return Cents::ZERO;
    }
    Cents::parse(raw).unwrap_or_else(|| {
      self.coerced(column, raw);
      Cents::ZERO
    })
  }

  /// A non-negative amount; negatives are coerced to zero.
  fn unsigned_money(&self, column: &str) -> Cents {
    let amount = self.money(column);
    if amount.is_negative() {
      self.coerced(column, self.get(column));
      Cents::ZERO
    } else {
      amount
    }
  }

  /// A count. Spreadsheet-style integral floats (`"3.0"`) are accepted.
  fn count(&self, column: &str) -> u32 {
    let raw = self.get(column);
    if raw.is_empty() {
      return 0;
    }
    raw
      .parse::<u32>()
      .ok()
      .or_else(|| {
        raw
          .parse::<f64>()
          .ok()
          .filter(|v| (0.0..=f64::from(u32::MAX)).contains(v) && v.fract() == 0.0)
          .map(|v| v as u32)
      })
      .unwrap_or_else(|| {
        self.coerced(column, raw);
        0
      })
  }

  fn flag(&self, column: &str) -> bool {
    match self.get(column).to_ascii_lowercase().as_str() {
      "" | "false" | "0" | "no" | "n" => false,
      "true" | "1" | "yes" | "y" | "x" => true,
      other => {
        self.coerced(column, other);
        false
      }
    }
  }
}

// ─── TableRow ────────────────────────────────────────────────────────────────

/// A domain type stored one-per-row in a CSV table.
pub trait TableRow: Sized {
  const TABLE: &'static Table;

  fn decode(row: &Row<'_>) -> Result<Self>;

  /// Cells in the order of `TABLE.columns`.
  fn encode(&self) -> Vec<String>;
}

impl TableRow for DailyRecord {
  const TABLE: &'static Table = &DAILY_SALES;

  fn decode(row: &Row<'_>) -> Result<Self> {
    Ok(DailyRecord {
      date:              row.date("date")?,
      morning_sales:     row.unsigned_money("morning_sales"),
      afternoon_sales:   row.unsigned_money("afternoon_sales"),
      evening_sales:     row.unsigned_money("evening_sales"),
      guests_morning:    row.count("guests_morning"),
      guests_afternoon:  row.count("guests_afternoon"),
      guests_evening:    row.count("guests_evening"),
      tickets_morning:   row.count("tickets_morning"),
      tickets_afternoon: row.count("tickets_afternoon"),
      tickets_evening:   row.count("tickets_evening"),
      notes:             row.get("notes").to_owned(),
    })
  }

  fn encode(&self) -> Vec<String> {
    vec![
      self.date.to_string(),
      self.morning_sales.to_string(),
      self.afternoon_sales.to_string(),
      self.evening_sales.to_string(),
      self.total_sales().to_string(),
      self.guests_morning.to_string(),
      self.guests_afternoon.to_string(),
      self.guests_evening.to_string(),
      self.tickets_morning.to_string(),
      self.tickets_afternoon.to_string(),
      self.tickets_evening.to_string(),
      self.notes.clone(),
    ]
  }
}

impl TableRow for CostEntry {
  const TABLE: &'static Table = &COSTS;

  fn decode(row: &Row<'_>) -> Result<Self> {
    let source: CostSource = row.key("source")?;
    Ok(CostEntry {
      id: row.key("id")?,
      date: row.date("date")?,
      source,
      category: row.get("category").to_owned(),
      description: row.get("description").to_owned(),
      amount: row.money("amount"),
      fixed: row.flag("fixed"),
    })
  }

  fn encode(&self) -> Vec<String> {
    vec![
      self.id.hyphenated().to_string(),
      self.date.to_string(),
      self.source.to_string(),
      self.category.clone(),
      self.description.clone(),
      self.amount.to_string(),
      self.fixed.to_string(),
    ]
  }
}

impl TableRow for InventorySnapshot {
  const TABLE: &'static Table = &INVENTORY;

  fn decode(row: &Row<'_>) -> Result<Self> {
    let year: i32 = row.key("year")?;
    let month: u32 = row.key("month")?;
    if !(1..=12).contains(&month) {
      return Err(row.corrupt(format!("month {month} out of range")));
    }
    let raw_updated = row.get("updated_on");
    let updated_on = NaiveDate::parse_from_str(raw_updated, "%Y-%m-%d")
      .ok()
      .or_else(|| {
        if !raw_updated.is_empty() {
          row.coerced("updated_on", raw_updated);
        }
        NaiveDate::from_ymd_opt(year, month, 1)
      })
      .ok_or_else(|| row.corrupt(format!("year {year} out of range")))?;
    Ok(InventorySnapshot {
      year,
      month,
      closing_value: row.money("closing_value"),
      updated_on,
    })
  }

  fn encode(&self) -> Vec<String> {
    vec![
      self.year.to_string(),
      self.month.to_string(),
      self.closing_value.to_string(),
      self.updated_on.to_string(),
    ]
  }
}

impl TableRow for PayrollPosition {
  const TABLE: &'static Table = &PAYROLL;

  fn decode(row: &Row<'_>) -> Result<Self> {
    let mut headcount = [0u32; 12];
    for (i, slot) in headcount.iter_mut().enumerate() {
      *slot = row.count(headcount_column(i + 1));
    }
    Ok(PayrollPosition {
      id: row.key::<Uuid>("id")?,
      year: row.key("year")?,
      title: row.get("title").to_owned(),
      annual_gross: row.unsigned_money("annual_gross"),
      headcount,
      structural: row.flag("structural"),
    })
  }

  fn encode(&self) -> Vec<String> {
    let mut cells = vec![
      self.id.hyphenated().to_string(),
      self.year.to_string(),
      self.title.clone(),
      self.annual_gross.to_string(),
    ];
    cells.extend(self.headcount.iter().map(u32::to_string));
    cells.push(self.structural.to_string());
    cells
  }
}
