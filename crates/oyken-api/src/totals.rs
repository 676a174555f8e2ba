//! `GET /totals?year=[&month=]`: sales roll-up for a year or a month.

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::Datelike;
use oyken_core::{
  aggregate::{Metrics, MonthTotals, PeriodTotals, SlotFigures, monthly_totals, totals_for},
  calendar::Period,
  store::OperationsStore,
};
use serde::Serialize;

use crate::{ApiState, error::ApiError, params::PeriodParams};

#[derive(Debug, Serialize)]
pub struct TotalsReport {
  pub period:     Period,
  pub totals:     PeriodTotals,
  /// Summed figures with ratios over the whole period.
  pub summary:    Metrics,
  /// Mean per recorded day.
  pub daily_mean: Metrics,
  pub slots:      Vec<SlotFigures>,
  pub months:     Vec<MonthTotals>,
}

pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<PeriodParams>,
) -> Result<Json<TotalsReport>, ApiError>
where
  S: OperationsStore,
{
  let period = params.period(state.clock.today().year())?;
  let records = state.store.list_records().await.map_err(ApiError::store)?;
  let totals = totals_for(&records, period);
  Ok(Json(TotalsReport {
    period,
    totals,
    summary: totals.metrics(),
    daily_mean: totals.mean(),
    slots: totals.slots(),
    months: monthly_totals(&records, period),
  }))
}
