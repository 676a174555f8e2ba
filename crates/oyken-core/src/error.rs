//! Error types for `oyken-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid entry: {0}")]
  InvalidEntry(String),

  #[error("invalid period: month {month} of {year}")]
  InvalidPeriod { year: i32, month: u32 },

  #[error("unknown cost source: {0:?}")]
  UnknownCostSource(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
