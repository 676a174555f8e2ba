//! Handlers for `/costs` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/costs` | Optional `?year=&month=&source=` |
//! | `POST`   | `/costs` | Body: [`NewCostEntry`]; returns 201 + stored entry |
//! | `DELETE` | `/costs/:id` | 204, or 404 if not found |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use oyken_core::{
  ledger::{CostEntry, CostFilter, NewCostEntry},
  store::OperationsStore,
};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

/// `GET /costs[?year=][&month=][&source=purchase|shrinkage|expense]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(filter): Query<CostFilter>,
) -> Result<Json<Vec<CostEntry>>, ApiError>
where
  S: OperationsStore,
{
  let mut costs = state.store.list_costs().await.map_err(ApiError::store)?;
  costs.retain(|c| filter.matches(c));
  Ok(Json(costs))
}

/// `POST /costs`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewCostEntry>,
) -> Result<impl IntoResponse, ApiError>
where
  S: OperationsStore,
{
  let entry = state.store.add_cost(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(entry)))
}

/// `DELETE /costs/:id`
pub async fn delete_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: OperationsStore,
{
  if state.store.delete_cost(id).await.map_err(ApiError::store)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("cost entry {id} not found")))
  }
}
