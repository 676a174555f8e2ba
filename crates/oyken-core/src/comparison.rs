//! Day comparison: one target day measured against its year-over-year
//! comparable, the previous calendar day and the average of earlier days
//! sharing its weekday.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
  aggregate::{Metrics, PeriodTotals},
  calendar::shift_days,
  record::DailyRecord,
  resolver::{ComparablePeriod, resolve},
  variance::Variance,
};

/// Variances of every comparable metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricVariances {
  pub total_sales:     Variance,
  pub morning_sales:   Variance,
  pub afternoon_sales: Variance,
  pub evening_sales:   Variance,
  pub guests:          Variance,
  pub tickets:         Variance,
  pub average_ticket:  Variance,
  pub per_guest_spend: Variance,
}

impl MetricVariances {
  pub fn between(actual: &Metrics, base: &Metrics) -> Self {
    Self {
      total_sales:     Variance::between(actual.total_sales, base.total_sales),
      morning_sales:   Variance::between(actual.morning_sales, base.morning_sales),
      afternoon_sales: Variance::between(
        actual.afternoon_sales,
        base.afternoon_sales,
      ),
      evening_sales:   Variance::between(actual.evening_sales, base.evening_sales),
      guests:          Variance::between(actual.guests, base.guests),
      tickets:         Variance::between(actual.tickets, base.tickets),
      average_ticket:  Variance::between(actual.average_ticket, base.average_ticket),
      per_guest_spend: Variance::between(
        actual.per_guest_spend,
        base.per_guest_spend,
      ),
    }
  }
}

/// A baseline and how the target day fares against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
  pub baseline:    Metrics,
  /// Number of records the baseline was built from (0 = zero baseline).
  pub sample_days: usize,
  pub variances:   MetricVariances,
}

impl Benchmark {
  fn new(actual: &Metrics, baseline: Metrics, sample_days: usize) -> Self {
    Self {
      variances: MetricVariances::between(actual, &baseline),
      baseline,
      sample_days,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearOverYear {
  pub comparable: ComparablePeriod,
  pub benchmark:  Benchmark,
}

/// Everything the operational control view shows for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayComparison {
  pub date:            NaiveDate,
  pub actual:          Metrics,
  /// Whether a record exists for `date`; when not, `actual` is all zero.
  pub record_present:  bool,
  pub year_over_year:  YearOverYear,
  pub previous_day:    Benchmark,
  pub weekday_average: Benchmark,
}

/// Build the comparison for `target`. Pure; `records` need not be sorted.
pub fn compare_day(target: NaiveDate, records: &[DailyRecord]) -> DayComparison {
  let today = records.iter().find(|r| r.date == target);
  let actual = today.map(Metrics::of_record).unwrap_or_default();

  let comparable = resolve(target, records);
  let yoy_baseline = Metrics::of_record(&comparable.baseline());
  let yoy = Benchmark::new(
    &actual,
    yoy_baseline,
    usize::from(comparable.is_resolved()),
  );

  let yesterday = shift_days(target, -1);
  let previous = records.iter().find(|r| r.date == yesterday);
  let previous_day = Benchmark::new(
    &actual,
    previous.map(Metrics::of_record).unwrap_or_default(),
    usize::from(previous.is_some()),
  );

  let same_weekday = PeriodTotals::from_records(
    records
      .iter()
      .filter(|r| r.date < target && r.date.weekday() == target.weekday()),
  );
  let weekday_average =
    Benchmark::new(&actual, same_weekday.mean(), same_weekday.days);

  DayComparison {
    date: target,
    actual,
    record_present: today.is_some(),
    year_over_year: YearOverYear {
      comparable,
      benchmark: yoy,
    },
    previous_day,
    weekday_average,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Cents, resolver::Confidence, variance::Signal};

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn sales(date: NaiveDate, cents: i64) -> DailyRecord {
    DailyRecord {
      afternoon_sales: Cents(cents),
      tickets_afternoon: 10,
      ..DailyRecord::empty(date)
    }
  }

  #[test]
  fn year_over_year_rise() {
    let records = vec![
      sales(day(2024, 1, 15), 100_000),
      sales(day(2025, 1, 13), 120_000),
    ];
    let c = compare_day(day(2025, 1, 13), &records);
    assert!(c.record_present);
    assert_eq!(c.year_over_year.comparable.confidence, Confidence::Exact);
    let total = c.year_over_year.benchmark.variances.total_sales;
    assert_eq!(total.diff, 200.0);
    assert_eq!(total.percent, 20.0);
    assert_eq!(total.signal, Signal::Rise);
  }

  #[test]
  fn missing_comparable_is_a_zero_baseline() {
    let records = vec![sales(day(2025, 1, 13), 50_000)];
    let c = compare_day(day(2025, 1, 13), &records);
    assert_eq!(c.year_over_year.comparable.confidence, Confidence::None);
    assert_eq!(c.year_over_year.benchmark.sample_days, 0);
    assert_eq!(c.year_over_year.benchmark.variances.total_sales.percent, 100.0);
  }

  #[test]
  fn previous_day_and_weekday_average() {
    let records = vec![
      sales(day(2025, 1, 6), 40_000),
      sales(day(2025, 1, 12), 90_000),
      sales(day(2025, 1, 13), 100_000),
      sales(day(2024, 12, 30), 60_000),
      // Later Monday: must not count towards the average.
      sales(day(2025, 1, 20), 1),
    ];
    let c = compare_day(day(2025, 1, 13), &records);
    assert_eq!(c.previous_day.baseline.total_sales, 900.0);
    assert_eq!(c.previous_day.sample_days, 1);
    assert_eq!(c.weekday_average.sample_days, 2);
    assert_eq!(c.weekday_average.baseline.total_sales, 500.0);
    assert_eq!(c.weekday_average.variances.total_sales.percent, 100.0);
  }

  #[test]
  fn absent_day_compares_zero() {
    let c = compare_day(day(2025, 1, 13), &[]);
    assert!(!c.record_present);
    assert_eq!(c.actual, Metrics::default());
    assert_eq!(c.previous_day.variances.total_sales.percent, 0.0);
  }
}
