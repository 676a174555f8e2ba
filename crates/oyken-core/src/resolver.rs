//! Comparable-period resolution: "the same point in the business cycle, one
//! year earlier".
//!
//! Resolution is tiered. An exact ISO match (prior ISO year, same week, same
//! weekday) wins; otherwise the same weekday in an adjacent week is accepted
//! as an approximation; otherwise there is no comparable and downstream
//! variance maths sees a zero baseline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  calendar::{IsoPosition, one_year_earlier, prior_year_keys},
  record::DailyRecord,
};

/// How closely the resolved record matches the target's calendar position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
  Exact,
  Approximate,
  None,
}

/// The outcome of [`resolve`]. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparablePeriod {
  pub target_date:   NaiveDate,
  pub resolved_date: Option<NaiveDate>,
  pub confidence:    Confidence,
  /// The resolved record, absent when `confidence` is `None`.
  pub record:        Option<DailyRecord>,
}

impl ComparablePeriod {
  /// The figures to benchmark against. An unresolved comparable yields an
  /// all-zero record dated one year before the target.
  pub fn baseline(&self) -> DailyRecord {
    self
      .record
      .clone()
      .unwrap_or_else(|| DailyRecord::empty(one_year_earlier(self.target_date)))
  }

  pub fn is_resolved(&self) -> bool { self.record.is_some() }
}

/// Find the comparable record for `target` among `records`.
///
/// Pure and deterministic: the same inputs always produce the same result.
pub fn resolve(target: NaiveDate, records: &[DailyRecord]) -> ComparablePeriod {
  let keys = prior_year_keys(target);

  let tiers = [
    (Confidence::Exact, keys.exact.into_iter().collect::<Vec<_>>()),
    (Confidence::Approximate, keys.neighbours),
  ];

  for (confidence, wanted) in tiers {
    let candidates = records
      .iter()
      .filter(|r| wanted.contains(&IsoPosition::of(r.date)));
    if let Some(best) = closest(target, candidates) {
      return ComparablePeriod {
        target_date: target,
        resolved_date: Some(best.date),
        confidence,
        record: Some(best.clone()),
      };
    }
  }

  ComparablePeriod {
    target_date:   target,
    resolved_date: None,
    confidence:    Confidence::None,
    record:        None,
  }
}

/// Pick the candidate closest to `target` shifted back one year; ties go to
/// the earliest date.
fn closest<'a>(
  target: NaiveDate,
  candidates: impl Iterator<Item = &'a DailyRecord>,
) -> Option<&'a DailyRecord> {
  let reference = one_year_earlier(target);
  candidates.min_by_key(|r| {
    let distance = r.date.signed_duration_since(reference).num_days().abs();
    (distance, r.date)
  })
}

#[cfg(test)]
mod tests {
  use crate::Cents;

  use super::*;

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn with_total(date: NaiveDate, total: i64) -> DailyRecord {
    DailyRecord {
      morning_sales: Cents(total),
      ..DailyRecord::empty(date)
    }
  }

  #[test]
  fn exact_match_same_iso_week_and_weekday() {
    // 2025-01-13 is Monday of ISO week 3; Monday of week 3 of 2024 is the 15th.
    let records = vec![
      with_total(day(2024, 1, 8), 900),
      with_total(day(2024, 1, 15), 1000),
    ];
    let c = resolve(day(2025, 1, 13), &records);
    assert_eq!(c.confidence, Confidence::Exact);
    assert_eq!(c.resolved_date, Some(day(2024, 1, 15)));
    assert_eq!(c.baseline().total_sales(), Cents(1000));
  }

  #[test]
  fn adjacent_week_is_approximate() {
    let records = vec![with_total(day(2024, 1, 8), 1000)];
    let c = resolve(day(2025, 1, 13), &records);
    assert_eq!(c.confidence, Confidence::Approximate);
    assert_eq!(c.resolved_date, Some(day(2024, 1, 8)));
    assert_eq!(c.baseline().total_sales(), Cents(1000));
  }

  #[test]
  fn other_weekday_does_not_match() {
    // Tuesday of week 3, 2024.
    let records = vec![with_total(day(2024, 1, 16), 1000)];
    let c = resolve(day(2025, 1, 13), &records);
    assert_eq!(c.confidence, Confidence::None);
  }

  #[test]
  fn empty_prior_year_yields_zero_baseline() {
    let records = vec![with_total(day(2025, 1, 6), 1000)];
    let c = resolve(day(2025, 1, 13), &records);
    assert_eq!(c.confidence, Confidence::None);
    assert_eq!(c.resolved_date, None);
    assert!(!c.is_resolved());
    assert_eq!(c.baseline().total_sales(), Cents::ZERO);
    assert_eq!(c.baseline().total_guests(), 0);
  }

  #[test]
  fn approximate_prefers_closest_neighbour() {
    // Target: Monday 2025-01-13 → reference date 2024-01-13 (Saturday).
    // Neighbours: 2024-01-08 (5 days before) and 2024-01-22 (9 days after).
    let records = vec![
      with_total(day(2024, 1, 22), 2),
      with_total(day(2024, 1, 8), 1),
    ];
    let c = resolve(day(2025, 1, 13), &records);
    assert_eq!(c.resolved_date, Some(day(2024, 1, 8)));
  }

  #[test]
  fn duplicate_exact_candidates_resolve_deterministically() {
    // Without store deduplication two rows can share a date; the first in
    // iteration order with the minimal key is kept by `min_by_key`.
    let records = vec![
      with_total(day(2024, 1, 15), 1),
      with_total(day(2024, 1, 15), 2),
    ];
    let a = resolve(day(2025, 1, 13), &records);
    let b = resolve(day(2025, 1, 13), &records);
    assert_eq!(a, b);
    assert_eq!(a.confidence, Confidence::Exact);
  }

  #[test]
  fn nearer_neighbour_wins_when_exact_is_missing() {
    // Target Thursday 2025-07-10 (ISO week 28). Reference 2024-07-10 is a
    // Wednesday; week 28 Thursday of 2024 is 07-11. Without it the
    // neighbours are 07-04 (6 days before) and 07-18 (8 days after).
    let records = vec![
      with_total(day(2024, 7, 18), 2),
      with_total(day(2024, 7, 4), 1),
    ];
    let c = resolve(day(2025, 7, 10), &records);
    assert_eq!(c.confidence, Confidence::Approximate);
    assert_eq!(c.resolved_date, Some(day(2024, 7, 4)));
  }

  #[test]
  fn equal_distance_goes_to_earliest_date() {
    // Reference for 2025-01-13 is 2024-01-13; both candidates are 3 days away.
    let later = with_total(day(2024, 1, 16), 2);
    let earlier = with_total(day(2024, 1, 10), 1);
    let pick = closest(day(2025, 1, 13), [&later, &earlier].into_iter());
    assert_eq!(pick.map(|r| r.date), Some(day(2024, 1, 10)));
  }

  #[test]
  fn week_53_target_uses_neighbours_across_year_end() {
    // 2026-12-31: Thursday, ISO week 53 of 2026. 2025 has no week 53, so the
    // candidates are Thursday of week 52/2025 (2025-12-25) and Thursday of
    // week 1/2026 (2026-01-01).
    let records = vec![with_total(day(2026, 1, 1), 7)];
    let c = resolve(day(2026, 12, 31), &records);
    assert_eq!(c.confidence, Confidence::Approximate);
    assert_eq!(c.resolved_date, Some(day(2026, 1, 1)));
  }

  #[test]
  fn resolution_is_pure() {
    let records = vec![with_total(day(2024, 1, 8), 1000)];
    assert_eq!(
      resolve(day(2025, 1, 13), &records),
      resolve(day(2025, 1, 13), &records)
    );
  }
}
