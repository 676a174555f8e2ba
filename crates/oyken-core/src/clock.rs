//! Clock injection and the per-request context that replaces ambient "today"
//! state.

use chrono::{Local, NaiveDate};

/// Source of the current calendar date.
pub trait Clock: Send + Sync {
  fn today(&self) -> NaiveDate;
}

/// The local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn today(&self) -> NaiveDate { Local::now().date_naive() }
}

/// A clock stuck on one date, for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
  fn today(&self) -> NaiveDate { self.0 }
}

/// The date a command operates on: an explicit selection, or today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
  pub today:    NaiveDate,
  pub selected: Option<NaiveDate>,
}

impl RequestContext {
  pub fn new(clock: &dyn Clock, selected: Option<NaiveDate>) -> Self {
    Self {
      today: clock.today(),
      selected,
    }
  }

  pub fn target_date(&self) -> NaiveDate { self.selected.unwrap_or(self.today) }
}
