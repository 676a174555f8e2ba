//! Handlers for `/records` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/records` | Optional `?from=&to=` (inclusive); `ETag` = table signature |
//! | `GET`  | `/records/:date` | 404 if not found |
//! | `PUT`  | `/records/:date` | Body: [`DailyEntry`]; optional `If-Match`; 201 new / 200 replaced |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode, header},
  response::IntoResponse,
};
use chrono::NaiveDate;
use oyken_core::{
  record::{DailyEntry, DailyRecord, in_range},
  store::{OperationsStore, Signature},
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub from: Option<NaiveDate>,
  pub to:   Option<NaiveDate>,
}

/// `GET /records[?from=YYYY-MM-DD][&to=YYYY-MM-DD]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: OperationsStore,
{
  // Signature first: a write in between leaves the tag stale, never newer
  // than the data.
  let signature = state
    .store
    .records_signature()
    .await
    .map_err(ApiError::store)?;
  let records = state.store.list_records().await.map_err(ApiError::store)?;
  let records = in_range(&records, params.from, params.to);
  Ok(([(header::ETAG, signature.to_string())], Json(records)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /records/:date`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(date): Path<NaiveDate>,
) -> Result<Json<DailyRecord>, ApiError>
where
  S: OperationsStore,
{
  let record = state
    .store
    .get_record(date)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("no record for {date}")))?;
  Ok(Json(record))
}

// ─── Put ─────────────────────────────────────────────────────────────────────

/// `PUT /records/:date`: create or replace the record for `date`.
///
/// With `If-Match`, the write only happens if the table still has that
/// signature; otherwise 412. `If-Match: *` is the same as no header.
pub async fn put_one<S>(
  State(state): State<ApiState<S>>,
  Path(date): Path<NaiveDate>,
  headers: HeaderMap,
  Json(entry): Json<DailyEntry>,
) -> Result<impl IntoResponse, ApiError>
where
  S: OperationsStore,
{
  let expected = headers
    .get(header::IF_MATCH)
    .map(|v| {
      v.to_str()
        .map_err(|_| ApiError::BadRequest("If-Match is not valid text".into()))
    })
    .transpose()?
    .filter(|v| v.trim() != "*")
    .map(Signature::parse);

  let record = entry.into_record(date)?;
  let written = state
    .store
    .put_record(record, expected)
    .await
    .map_err(ApiError::store)?;

  let status = if written.replaced {
    StatusCode::OK
  } else {
    StatusCode::CREATED
  };
  Ok((
    status,
    [(header::ETAG, written.signature.to_string())],
    Json(written.record),
  ))
}
