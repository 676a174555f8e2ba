//! Query parameters shared by the report endpoints.

use oyken_core::calendar::Period;
use serde::Deserialize;

use crate::ApiError;

/// `?year=&month=`; the year defaults to the current one.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodParams {
  pub year:  Option<i32>,
  pub month: Option<u32>,
}

impl PeriodParams {
  pub fn period(&self, current_year: i32) -> Result<Period, ApiError> {
    Ok(Period::new(self.year.unwrap_or(current_year), self.month)?)
  }
}
