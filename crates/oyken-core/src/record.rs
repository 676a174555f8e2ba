//! Daily sales records: one row per calendar date, split into three service
//! slots.
//!
//! `total_sales` is never stored as an independent field: it is always the sum
//! of the three slot amounts, computed at read time.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Cents, Error, Result};

// ─── Slot ────────────────────────────────────────────────────────────────────

/// A service period within a trading day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
  Morning,
  Afternoon,
  Evening,
}

impl Slot {
  pub const ALL: [Slot; 3] = [Slot::Morning, Slot::Afternoon, Slot::Evening];

  pub fn as_str(self) -> &'static str {
    match self {
      Slot::Morning => "morning",
      Slot::Afternoon => "afternoon",
      Slot::Evening => "evening",
    }
  }
}

// ─── DailyRecord ─────────────────────────────────────────────────────────────

/// One day of trading figures. Unique per `date` within a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
  pub date:              NaiveDate,
  pub morning_sales:     Cents,
  pub afternoon_sales:   Cents,
  pub evening_sales:     Cents,
  #[serde(default)]
  pub guests_morning:    u32,
  #[serde(default)]
  pub guests_afternoon:  u32,
  #[serde(default)]
  pub guests_evening:    u32,
  #[serde(default)]
  pub tickets_morning:   u32,
  #[serde(default)]
  pub tickets_afternoon: u32,
  #[serde(default)]
  pub tickets_evening:   u32,
  #[serde(default)]
  pub notes:             String,
}

impl DailyRecord {
  /// A record with every figure at zero.
  pub fn empty(date: NaiveDate) -> Self {
    Self {
      date,
      morning_sales: Cents::ZERO,
      afternoon_sales: Cents::ZERO,
      evening_sales: Cents::ZERO,
      guests_morning: 0,
      guests_afternoon: 0,
      guests_evening: 0,
      tickets_morning: 0,
      tickets_afternoon: 0,
      tickets_evening: 0,
      notes: String::new(),
    }
  }

  pub fn sales(&self, slot: Slot) -> Cents {
    match slot {
      Slot::Morning => self.morning_sales,
      Slot::Afternoon => self.afternoon_sales,
      Slot::Evening => self.evening_sales,
    }
  }

  pub fn guests(&self, slot: Slot) -> u32 {
    match slot {
      Slot::Morning => self.guests_morning,
      Slot::Afternoon => self.guests_afternoon,
      Slot::Evening => self.guests_evening,
    }
  }

  pub fn tickets(&self, slot: Slot) -> u32 {
    match slot {
      Slot::Morning => self.tickets_morning,
      Slot::Afternoon => self.tickets_afternoon,
      Slot::Evening => self.tickets_evening,
    }
  }

  /// Sum of the three slot amounts.
  pub fn total_sales(&self) -> Cents {
    Slot::ALL.iter().map(|s| self.sales(*s)).sum()
  }

  pub fn total_guests(&self) -> u64 {
    Slot::ALL.iter().map(|s| u64::from(self.guests(*s))).sum()
  }

  pub fn total_tickets(&self) -> u64 {
    Slot::ALL.iter().map(|s| u64::from(self.tickets(*s))).sum()
  }
}

// ─── DailyEntry ──────────────────────────────────────────────────────────────

/// The figures an operator submits for one date. The date itself comes from
/// the request context, not from the entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyEntry {
  pub morning_sales:     Cents,
  pub afternoon_sales:   Cents,
  pub evening_sales:     Cents,
  #[serde(default)]
  pub guests_morning:    u32,
  #[serde(default)]
  pub guests_afternoon:  u32,
  #[serde(default)]
  pub guests_evening:    u32,
  #[serde(default)]
  pub tickets_morning:   u32,
  #[serde(default)]
  pub tickets_afternoon: u32,
  #[serde(default)]
  pub tickets_evening:   u32,
  #[serde(default)]
  pub notes:             String,
}

impl DailyEntry {
  /// Validate the entry and turn it into the record for `date`.
  ///
  /// Slot amounts must be non-negative; notes are trimmed.
  pub fn into_record(self, date: NaiveDate) -> Result<DailyRecord> {
    for (slot, amount) in [
      (Slot::Morning, self.morning_sales),
      (Slot::Afternoon, self.afternoon_sales),
      (Slot::Evening, self.evening_sales),
    ] {
      if amount.is_negative() {
        return Err(Error::InvalidEntry(format!(
          "{} sales must not be negative (got {amount})",
          slot.as_str()
        )));
      }
      if amount > Cents::MAX_INPUT {
        return Err(Error::InvalidEntry(format!(
          "{} sales of {amount} are out of range",
          slot.as_str()
        )));
      }
    }

    Ok(DailyRecord {
      date,
      morning_sales: self.morning_sales,
      afternoon_sales: self.afternoon_sales,
      evening_sales: self.evening_sales,
      guests_morning: self.guests_morning,
      guests_afternoon: self.guests_afternoon,
      guests_evening: self.guests_evening,
      tickets_morning: self.tickets_morning,
      tickets_afternoon: self.tickets_afternoon,
      tickets_evening: self.tickets_evening,
      notes: self.notes.trim().to_owned(),
    })
  }
}

// ─── Collections ─────────────────────────────────────────────────────────────

/// Collapse records sharing a date, keeping the last occurrence, and return
/// them ordered by date.
pub fn dedupe_by_date(
  records: impl IntoIterator<Item = DailyRecord>,
) -> Vec<DailyRecord> {
  let mut by_date = BTreeMap::new();
  for record in records {
    by_date.insert(record.date, record);
  }
  by_date.into_values().collect()
}

/// Insert or replace the record for `record.date`.
///
/// Returns the updated, date-ordered set and whether an existing record was
/// replaced.
pub fn upsert(
  records: Vec<DailyRecord>,
  record: DailyRecord,
) -> (Vec<DailyRecord>, bool) {
  let replaced = records.iter().any(|r| r.date == record.date);
  let merged = dedupe_by_date(records.into_iter().chain(std::iter::once(record)));
  (merged, replaced)
}

/// Records whose date falls in `from..=to`. Either bound may be open.
pub fn in_range(
  records: &[DailyRecord],
  from: Option<NaiveDate>,
  to: Option<NaiveDate>,
) -> Vec<DailyRecord> {
  records
    .iter()
    .filter(|r| from.is_none_or(|f| r.date >= f))
    .filter(|r| to.is_none_or(|t| r.date <= t))
    .cloned()
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn record(date: NaiveDate, morning: i64) -> DailyRecord {
    DailyRecord {
      morning_sales: Cents(morning),
      ..DailyRecord::empty(date)
    }
  }

  #[test]
  fn total_is_sum_of_slots() {
    let r = DailyRecord {
      morning_sales: Cents(10_000),
      afternoon_sales: Cents(25_050),
      evening_sales: Cents(40_000),
      ..DailyRecord::empty(day(2025, 3, 1))
    };
    assert_eq!(r.total_sales(), Cents(75_050));
  }

  #[test]
  fn dedupe_keeps_last_and_sorts() {
    let records = vec![
      record(day(2025, 1, 3), 1),
      record(day(2025, 1, 1), 2),
      record(day(2025, 1, 3), 3),
    ];
    let deduped = dedupe_by_date(records);
    assert_eq!(deduped.len(), 2);
    assert_eq!(deduped[0].date, day(2025, 1, 1));
    assert_eq!(deduped[1].morning_sales, Cents(3));
  }

  #[test]
  fn upsert_reports_replacement() {
    let (set, replaced) = upsert(vec![], record(day(2025, 1, 1), 1));
    assert!(!replaced);
    let (set, replaced) = upsert(set, record(day(2025, 1, 1), 9));
    assert!(replaced);
    assert_eq!(set.len(), 1);
    assert_eq!(set[0].morning_sales, Cents(9));
  }

  #[test]
  fn negative_slot_is_rejected() {
    let entry = DailyEntry {
      evening_sales: Cents(-1),
      ..DailyEntry::default()
    };
    assert!(entry.into_record(day(2025, 1, 1)).is_err());
  }

  #[test]
  fn oversized_slot_is_rejected() {
    let entry = DailyEntry {
      morning_sales: Cents(6_000_000_000_000_000_000),
      afternoon_sales: Cents(6_000_000_000_000_000_000),
      ..DailyEntry::default()
    };
    let err = entry.into_record(day(2025, 1, 1)).unwrap_err();
    assert!(err.to_string().contains("out of range"));

    let at_cap = DailyEntry {
      morning_sales: Cents::MAX_INPUT,
      ..DailyEntry::default()
    };
    assert!(at_cap.into_record(day(2025, 1, 1)).is_ok());
  }

  #[test]
  fn in_range_is_inclusive() {
    let records = vec![
      record(day(2025, 1, 1), 1),
      record(day(2025, 1, 2), 1),
      record(day(2025, 1, 3), 1),
    ];
    let hits = in_range(&records, Some(day(2025, 1, 2)), Some(day(2025, 1, 3)));
    assert_eq!(hits.len(), 2);
    assert_eq!(in_range(&records, None, None).len(), 3);
  }
}
