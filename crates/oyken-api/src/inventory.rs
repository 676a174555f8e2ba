//! Handlers for `/inventory` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/inventory` | Snapshots with their stock change, oldest first |
//! | `PUT`  | `/inventory/:year/:month` | Body: `{"closing_value": 1234.5}`; 201 new / 200 replaced |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use oyken_core::{
  Cents,
  ledger::{InventorySnapshot, StockMovement, stock_movements},
  store::OperationsStore,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

/// `GET /inventory`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<StockMovement>>, ApiError>
where
  S: OperationsStore,
{
  let snapshots = state.store.list_inventory().await.map_err(ApiError::store)?;
  Ok(Json(stock_movements(&snapshots)))
}

#[derive(Debug, Deserialize)]
pub struct SnapshotBody {
  pub closing_value: Cents,
  /// Defaults to today.
  pub updated_on:    Option<NaiveDate>,
}

/// `PUT /inventory/:year/:month`
pub async fn put_one<S>(
  State(state): State<ApiState<S>>,
  Path((year, month)): Path<(i32, u32)>,
  Json(body): Json<SnapshotBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: OperationsStore,
{
  let updated_on = body.updated_on.unwrap_or_else(|| state.clock.today());
  let snapshot = InventorySnapshot::new(year, month, body.closing_value, updated_on)?;
  let replaced = state
    .store
    .put_inventory(snapshot.clone())
    .await
    .map_err(ApiError::store)?;
  let status = if replaced {
    StatusCode::OK
  } else {
    StatusCode::CREATED
  };
  Ok((status, Json(snapshot)))
}
