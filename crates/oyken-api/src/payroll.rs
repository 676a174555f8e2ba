//! Handlers for `/payroll` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/payroll` | Optional `?year=`; each position with its monthly cost buildup |
//! | `POST`   | `/payroll` | Body: [`NewPayrollPosition`]; returns 201 + stored position |
//! | `DELETE` | `/payroll/:id` | 204, or 404 if not found |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use oyken_core::{
  ledger::{NewPayrollPosition, PayrollCost, PayrollPosition},
  store::OperationsStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub year: Option<i32>,
}

/// A position with its employer cost per month and over the year.
#[derive(Debug, Serialize)]
pub struct PositionCost {
  #[serde(flatten)]
  pub position: PayrollPosition,
  pub monthly:  Vec<PayrollCost>,
  pub annual:   PayrollCost,
}

impl PositionCost {
  fn new(position: PayrollPosition, social_security_rate: f64) -> Self {
    let monthly: Vec<PayrollCost> = (1..=12)
      .map(|m| position.monthly_cost(m, social_security_rate))
      .collect();
    Self {
      annual: monthly.iter().copied().sum(),
      monthly,
      position,
    }
  }
}

/// `GET /payroll[?year=]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<PositionCost>>, ApiError>
where
  S: OperationsStore,
{
  let positions = state.store.list_payroll().await.map_err(ApiError::store)?;
  let rate = state.statement.social_security_rate;
  Ok(Json(
    positions
      .into_iter()
      .filter(|p| params.year.is_none_or(|y| p.year == y))
      .map(|p| PositionCost::new(p, rate))
      .collect(),
  ))
}

/// `POST /payroll`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewPayrollPosition>,
) -> Result<impl IntoResponse, ApiError>
where
  S: OperationsStore,
{
  let position = state.store.add_payroll(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(position)))
}

/// `DELETE /payroll/:id`
pub async fn delete_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: OperationsStore,
{
  if state.store.delete_payroll(id).await.map_err(ApiError::store)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("payroll position {id} not found")))
  }
}
