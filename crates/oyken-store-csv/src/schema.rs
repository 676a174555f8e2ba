//! File names and column layouts of the CSV tables.
//!
//! Columns are looked up by header name, so extra columns are ignored and
//! missing optional columns read as their default (0, empty, false).

/// One CSV table: its file name inside the data directory and the header
/// written on save.
#[derive(Debug, Clone, Copy)]
pub struct Table {
  pub file:    &'static str,
  pub columns: &'static [&'static str],
}

pub const DAILY_SALES: Table = Table {
  file:    "daily_sales.csv",
  // `total_sales` is written for spreadsheet readers and ignored on load.
  columns: &[
    "date",
    "morning_sales",
    "afternoon_sales",
    "evening_sales",
    "total_sales",
    "guests_morning",
    "guests_afternoon",
    "guests_evening",
    "tickets_morning",
    "tickets_afternoon",
    "tickets_evening",
    "notes",
  ],
};

pub const COSTS: Table = Table {
  file:    "costs.csv",
  columns: &["id", "date", "source", "category", "description", "amount", "fixed"],
};

pub const INVENTORY: Table = Table {
  file:    "inventory.csv",
  columns: &["year", "month", "closing_value", "updated_on"],
};

pub const PAYROLL: Table = Table {
  file:    "payroll.csv",
  columns: &[
    "id",
    "year",
    "title",
    "annual_gross",
    "m01",
    "m02",
    "m03",
    "m04",
    "m05",
    "m06",
    "m07",
    "m08",
    "m09",
    "m10",
    "m11",
    "m12",
    "structural",
  ],
};

/// Header of the monthly headcount column for `month` (1–12).
pub fn headcount_column(month: usize) -> &'static str { PAYROLL.columns[3 + month] }
