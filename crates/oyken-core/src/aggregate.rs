//! Secondary ratios derived from the three-slot structure, for a single day
//! or any roll-up of days.
//!
//! Every ratio is total: a zero (or negative) denominator yields `0.0`.

use serde::{Deserialize, Serialize};

use crate::{
  Cents,
  calendar::Period,
  record::{DailyRecord, Slot},
};

// ─── Ratios ──────────────────────────────────────────────────────────────────

fn ratio(numerator: f64, denominator: f64) -> f64 {
  if denominator > 0.0 {
    numerator / denominator
  } else {
    0.0
  }
}

/// Average ticket value of a slot (or a day, or a month).
pub fn average_ticket(sales: f64, tickets: f64) -> f64 { ratio(sales, tickets) }

/// Spend per guest.
pub fn per_guest_spend(total_sales: f64, total_guests: f64) -> f64 {
  ratio(total_sales, total_guests)
}

/// Tickets issued per guest.
pub fn tickets_per_guest(total_tickets: f64, total_guests: f64) -> f64 {
  ratio(total_tickets, total_guests)
}

// ─── Metrics ─────────────────────────────────────────────────────────────────

/// The comparable figures of a day or an averaged set of days. Currency
/// amounts are in units, not cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
  pub total_sales:       f64,
  pub morning_sales:     f64,
  pub afternoon_sales:   f64,
  pub evening_sales:     f64,
  pub guests:            f64,
  pub tickets:           f64,
  pub average_ticket:    f64,
  pub per_guest_spend:   f64,
  pub tickets_per_guest: f64,
}

impl Metrics {
  fn from_parts(slot_sales: [f64; 3], guests: f64, tickets: f64) -> Self {
    let total_sales: f64 = slot_sales.iter().sum();
    Self {
      total_sales,
      morning_sales: slot_sales[0],
      afternoon_sales: slot_sales[1],
      evening_sales: slot_sales[2],
      guests,
      tickets,
      average_ticket: average_ticket(total_sales, tickets),
      per_guest_spend: per_guest_spend(total_sales, guests),
      tickets_per_guest: tickets_per_guest(tickets, guests),
    }
  }

  pub fn of_record(record: &DailyRecord) -> Self {
    PeriodTotals::from_records(std::iter::once(record)).metrics()
  }
}

// ─── PeriodTotals ────────────────────────────────────────────────────────────

/// Raw sums over a set of daily records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTotals {
  /// Number of records that contributed.
  pub days:              usize,
  pub morning_sales:     Cents,
  pub afternoon_sales:   Cents,
  pub evening_sales:     Cents,
  pub guests_morning:    u64,
  pub guests_afternoon:  u64,
  pub guests_evening:    u64,
  pub tickets_morning:   u64,
  pub tickets_afternoon: u64,
  pub tickets_evening:   u64,
}

/// Per-slot view of a [`PeriodTotals`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotFigures {
  pub slot:            Slot,
  pub sales:           Cents,
  pub guests:          u64,
  pub tickets:         u64,
  pub average_ticket:  f64,
  pub per_guest_spend: f64,
}

impl PeriodTotals {
  pub fn from_records<'a>(records: impl IntoIterator<Item = &'a DailyRecord>) -> Self {
    records.into_iter().fold(Self::default(), |mut acc, r| {
      acc.days += 1;
      acc.morning_sales += r.morning_sales;
      acc.afternoon_sales += r.afternoon_sales;
      acc.evening_sales += r.evening_sales;
      acc.guests_morning += u64::from(r.guests_morning);
      acc.guests_afternoon += u64::from(r.guests_afternoon);
      acc.guests_evening += u64::from(r.guests_evening);
      acc.tickets_morning += u64::from(r.tickets_morning);
      acc.tickets_afternoon += u64::from(r.tickets_afternoon);
      acc.tickets_evening += u64::from(r.tickets_evening);
      acc
    })
  }

  pub fn sales(&self, slot: Slot) -> Cents {
    match slot {
      Slot::Morning => self.morning_sales,
      Slot::Afternoon => self.afternoon_sales,
      Slot::Evening => self.evening_sales,
    }
  }

  pub fn guests(&self, slot: Slot) -> u64 {
    match slot {
      Slot::Morning => self.guests_morning,
      Slot::Afternoon => self.guests_afternoon,
      Slot::Evening => self.guests_evening,
    }
  }

  pub fn tickets(&self, slot: Slot) -> u64 {
    match slot {
      Slot::Morning => self.tickets_morning,
      Slot::Afternoon => self.tickets_afternoon,
      Slot::Evening => self.tickets_evening,
    }
  }

  pub fn total_sales(&self) -> Cents {
    Slot::ALL.iter().map(|s| self.sales(*s)).sum()
  }

  pub fn total_guests(&self) -> u64 { Slot::ALL.iter().map(|s| self.guests(*s)).sum() }

  pub fn total_tickets(&self) -> u64 { Slot::ALL.iter().map(|s| self.tickets(*s)).sum() }

  pub fn slots(&self) -> Vec<SlotFigures> {
    Slot::ALL
      .iter()
      .map(|&slot| {
        let sales = self.sales(slot);
        let guests = self.guests(slot);
        let tickets = self.tickets(slot);
        SlotFigures {
          slot,
          sales,
          guests,
          tickets,
          average_ticket: average_ticket(sales.as_units(), tickets as f64),
          per_guest_spend: per_guest_spend(sales.as_units(), guests as f64),
        }
      })
      .collect()
  }

  /// Summed figures with ratios derived from the sums.
  pub fn metrics(&self) -> Metrics {
    Metrics::from_parts(
      Slot::ALL.map(|s| self.sales(s).as_units()),
      self.total_guests() as f64,
      self.total_tickets() as f64,
    )
  }

  /// Per-day mean figures; all zero when no day contributed.
  pub fn mean(&self) -> Metrics {
    if self.days == 0 {
      return Metrics::default();
    }
    let n = self.days as f64;
    Metrics::from_parts(
      Slot::ALL.map(|s| self.sales(s).as_units() / n),
      self.total_guests() as f64 / n,
      self.total_tickets() as f64 / n,
    )
  }
}

/// Roll-up of one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthTotals {
  pub year:   i32,
  pub month:  u32,
  pub totals: PeriodTotals,
}

/// Totals of every record falling within `period`.
pub fn totals_for(records: &[DailyRecord], period: Period) -> PeriodTotals {
  PeriodTotals::from_records(records.iter().filter(|r| period.contains(r.date)))
}

/// One roll-up per month of `period` (twelve for a whole year); months without
/// records are all zero.
pub fn monthly_totals(records: &[DailyRecord], period: Period) -> Vec<MonthTotals> {
  period
    .months()
    .map(|month| MonthTotals {
      year: period.year,
      month,
      totals: totals_for(records, Period::month(period.year, month)),
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn sample(date: NaiveDate) -> DailyRecord {
    DailyRecord {
      morning_sales: Cents(30_000),
      afternoon_sales: Cents(50_000),
      evening_sales: Cents(20_000),
      guests_morning: 10,
      guests_afternoon: 20,
      guests_evening: 10,
      tickets_morning: 6,
      tickets_afternoon: 10,
      tickets_evening: 4,
      ..DailyRecord::empty(date)
    }
  }

  #[test]
  fn zero_denominators_are_total() {
    assert_eq!(average_ticket(123.0, 0.0), 0.0);
    assert_eq!(average_ticket(-5.0, 0.0), 0.0);
    assert_eq!(per_guest_spend(1000.0, 0.0), 0.0);
    assert_eq!(tickets_per_guest(7.0, 0.0), 0.0);
  }

  #[test]
  fn day_metrics() {
    let m = Metrics::of_record(&sample(day(2025, 3, 3)));
    assert_eq!(m.total_sales, 1000.0);
    assert_eq!(m.guests, 40.0);
    assert_eq!(m.tickets, 20.0);
    assert_eq!(m.average_ticket, 50.0);
    assert_eq!(m.per_guest_spend, 25.0);
    assert_eq!(m.tickets_per_guest, 0.5);
  }

  #[test]
  fn slot_ratios() {
    let totals = PeriodTotals::from_records([&sample(day(2025, 3, 3))]);
    let morning = totals.slots()[0];
    assert_eq!(morning.slot, Slot::Morning);
    assert_eq!(morning.average_ticket, 50.0);
    assert_eq!(morning.per_guest_spend, 30.0);
  }

  #[test]
  fn monthly_rollup_matches_daily_ratios() {
    let records = vec![sample(day(2025, 3, 3)), sample(day(2025, 3, 4))];
    let months = monthly_totals(&records, Period::year(2025));
    assert_eq!(months.len(), 12);
    let march = months[2].totals;
    assert_eq!(march.days, 2);
    assert_eq!(march.total_sales(), Cents(200_000));
    assert_eq!(march.metrics().average_ticket, 50.0);
    assert_eq!(months[0].totals, PeriodTotals::default());
  }

  #[test]
  fn mean_of_nothing_is_zero() {
    assert_eq!(PeriodTotals::default().mean(), Metrics::default());
  }

  #[test]
  fn mean_divides_by_days() {
    let records = [sample(day(2025, 3, 3)), DailyRecord::empty(day(2025, 3, 10))];
    let mean = PeriodTotals::from_records(records.iter()).mean();
    assert_eq!(mean.total_sales, 500.0);
    assert_eq!(mean.guests, 20.0);
  }
}
