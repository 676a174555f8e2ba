//! Financial statement endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/statements/income` | `?year=[&month=]`; monthly lines plus total |
//! | `GET`  | `/statements/breakeven` | `?year=[&month=]`; daily figure for a single month |

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::Datelike;
use oyken_core::{
  statement::{Breakeven, IncomeStatement, breakeven as breakeven_for, income_statement},
  store::OperationsStore,
};

use crate::{ApiState, error::ApiError, params::PeriodParams};

/// `GET /statements/income`
pub async fn income<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<PeriodParams>,
) -> Result<Json<IncomeStatement>, ApiError>
where
  S: OperationsStore,
{
  let period = params.period(state.clock.today().year())?;
  let ledgers = state.store.load_ledgers().await.map_err(ApiError::store)?;
  Ok(Json(income_statement(period, &ledgers, &state.statement)))
}

/// `GET /statements/breakeven`
pub async fn breakeven<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<PeriodParams>,
) -> Result<Json<Breakeven>, ApiError>
where
  S: OperationsStore,
{
  let period = params.period(state.clock.today().year())?;
  let ledgers = state.store.load_ledgers().await.map_err(ApiError::store)?;
  Ok(Json(breakeven_for(period, &ledgers, &state.statement)))
}
