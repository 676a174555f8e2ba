//! `GET /comparison[?date=YYYY-MM-DD]`: the day comparison for the selected
//! date, or for today.

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::NaiveDate;
use oyken_core::{
  comparison::{DayComparison, compare_day},
  store::OperationsStore,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ComparisonParams {
  pub date: Option<NaiveDate>,
}

pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ComparisonParams>,
) -> Result<Json<DayComparison>, ApiError>
where
  S: OperationsStore,
{
  let target = state.context(params.date).target_date();
  let records = state.store.list_records().await.map_err(ApiError::store)?;
  Ok(Json(compare_day(target, &records)))
}
