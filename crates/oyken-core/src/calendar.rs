//! ISO-8601 calendar positions and small date helpers.
//!
//! Week arithmetic is always done on real dates (±7 days) and converted back
//! to `(iso_year, iso_week)` through [`chrono::IsoWeek`], so the 52/53-week
//! boundary is handled by the calendar rather than by hand.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const WEEKDAYS: [Weekday; 7] = [
  Weekday::Mon,
  Weekday::Tue,
  Weekday::Wed,
  Weekday::Thu,
  Weekday::Fri,
  Weekday::Sat,
  Weekday::Sun,
];

/// A date's position in the ISO week calendar. `weekday` is 0 for Monday
/// through 6 for Sunday.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct IsoPosition {
  pub iso_year: i32,
  pub iso_week: u32,
  pub weekday:  u32,
}

impl IsoPosition {
  pub fn of(date: NaiveDate) -> Self {
    let week = date.iso_week();
    Self {
      iso_year: week.year(),
      iso_week: week.week(),
      weekday:  date.weekday().num_days_from_monday(),
    }
  }

  /// The calendar date at this position, if the week exists in that ISO year.
  pub fn to_date(self) -> Option<NaiveDate> {
    let weekday = WEEKDAYS.get(self.weekday as usize).copied()?;
    NaiveDate::from_isoywd_opt(self.iso_year, self.iso_week, weekday)
  }
}

/// Number of ISO weeks (52 or 53) in `iso_year`. December 28th always falls
/// in the last week of its ISO year.
pub fn weeks_in_iso_year(iso_year: i32) -> u32 {
  NaiveDate::from_ymd_opt(iso_year, 12, 28)
    .map(|d| d.iso_week().week())
    .unwrap_or(52)
}

/// The same calendar day one year earlier; February 29th maps to the 28th.
pub fn one_year_earlier(date: NaiveDate) -> NaiveDate {
  date.checked_sub_months(Months::new(12)).unwrap_or(NaiveDate::MIN)
}

/// Shift a date by a signed number of days, saturating at the calendar range.
pub fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
  let magnitude = Days::new(days.unsigned_abs());
  let shifted = if days >= 0 {
    date.checked_add_days(magnitude)
  } else {
    date.checked_sub_days(magnitude)
  };
  shifted.unwrap_or(if days >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}

/// ISO positions searched when looking for a comparable one year before
/// `target`: the exact position (if that week exists in the prior ISO year)
/// and the same weekday in the neighbouring weeks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorYearKeys {
  pub exact:      Option<IsoPosition>,
  pub neighbours: Vec<IsoPosition>,
}

pub fn prior_year_keys(target: NaiveDate) -> PriorYearKeys {
  let here = IsoPosition::of(target);
  let wanted = IsoPosition {
    iso_year: here.iso_year - 1,
    ..here
  };

  match wanted.to_date() {
    Some(anchor) => PriorYearKeys {
      exact:      Some(wanted),
      neighbours: vec![
        IsoPosition::of(shift_days(anchor, -7)),
        IsoPosition::of(shift_days(anchor, 7)),
      ],
    },
    // Week 53 does not exist in the prior ISO year: its neighbours are that
    // year's last week and the first week of the following year.
    None => {
      let last_week = IsoPosition {
        iso_week: weeks_in_iso_year(wanted.iso_year),
        ..wanted
      };
      let neighbours = last_week
        .to_date()
        .map(|last| vec![IsoPosition::of(last), IsoPosition::of(shift_days(last, 7))])
        .unwrap_or_default();
      PriorYearKeys {
        exact: None,
        neighbours,
      }
    }
  }
}

/// Number of days in a calendar month, `None` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
  let first = NaiveDate::from_ymd_opt(year, month, 1)?;
  let next = first.checked_add_months(Months::new(1))?;
  u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

/// A reporting period: a whole year, or one month of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
  pub year:  i32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub month: Option<u32>,
}

impl Period {
  /// Build a period, rejecting months outside `1..=12`.
  pub fn new(year: i32, month: Option<u32>) -> Result<Self> {
    match month {
      Some(m) if !(1..=12).contains(&m) => {
        Err(Error::InvalidPeriod { year, month: m })
      }
      _ => Ok(Self { year, month }),
    }
  }

  pub fn year(year: i32) -> Self { Self { year, month: None } }

  pub fn month(year: i32, month: u32) -> Self {
    Self {
      year,
      month: Some(month),
    }
  }

  /// The months covered, in order.
  pub fn months(&self) -> std::ops::RangeInclusive<u32> {
    match self.month {
      Some(m) => m..=m,
      None => 1..=12,
    }
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    date.year() == self.year && self.month.is_none_or(|m| date.month() == m)
  }

  /// Calendar days in the period.
  pub fn days(&self) -> u32 {
    self
      .months()
      .filter_map(|m| days_in_month(self.year, m))
      .sum()
  }
}

impl std::fmt::Display for Period {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self.month {
      Some(m) => write!(f, "{}-{m:02}", self.year),
      None => write!(f, "{}", self.year),
    }
  }
}
