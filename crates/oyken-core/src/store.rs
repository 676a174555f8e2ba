//! The `OperationsStore` trait and its version signatures.
//!
//! The trait is implemented by storage backends (e.g. `oyken-store-csv`).
//! Higher layers (`oyken-api`, `oyken-cli`) depend on this abstraction, not on
//! any concrete backend.

use std::{fmt, future::Future};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  ledger::{
    CostEntry, InventorySnapshot, NewCostEntry, NewPayrollPosition,
    PayrollPosition,
  },
  record::DailyRecord,
  statement::Ledgers,
};

// ─── Signature ───────────────────────────────────────────────────────────────

/// Opaque version tag of a stored table. Rendered as a quoted string so it
/// can be used verbatim as an HTTP `ETag`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature(String);

impl Signature {
  pub fn new(digest: impl Into<String>) -> Self { Self(digest.into()) }

  /// Read a signature from an `ETag`/`If-Match` style value. Surrounding
  /// quotes and a weak `W/` prefix are ignored.
  pub fn parse(value: &str) -> Self {
    let value = value.trim();
    let value = value.strip_prefix("W/").unwrap_or(value);
    Self(value.trim_matches('"').to_owned())
  }

  pub fn digest(&self) -> &str { &self.0 }
}

impl fmt::Display for Signature {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "\"{}\"", self.0)
  }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Broad classes of backend failure that callers report differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
  /// The table changed since the caller's signature was taken.
  Conflict,
  /// The caller's input was rejected by domain validation.
  Invalid,
  /// Anything else: I/O, corrupt tables.
  Internal,
}

/// Implemented by backend error types so that generic callers can tell a
/// version conflict or a validation failure from an internal error.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> FailureKind;
}

/// Result of [`OperationsStore::put_record`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordWrite {
  pub record:    DailyRecord,
  /// An existing record for the same date was overwritten.
  pub replaced:  bool,
  /// Signature of the table after the write.
  pub signature: Signature,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an Oyken storage backend.
///
/// Every table is read in full and written in full. Writes to the daily table
/// may carry the signature the caller last saw; a backend must refuse the
/// write if the table has changed since.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait OperationsStore: Send + Sync {
  type Error: StoreError;

  // ── Daily records ─────────────────────────────────────────────────────

  /// All daily records, one per date, ordered by date.
  fn list_records(
    &self,
  ) -> impl Future<Output = Result<Vec<DailyRecord>, Self::Error>> + Send + '_;

  /// Current signature of the daily records table.
  fn records_signature(
    &self,
  ) -> impl Future<Output = Result<Signature, Self::Error>> + Send + '_;

  /// Insert or replace the record for `record.date`.
  fn put_record(
    &self,
    record: DailyRecord,
    expected: Option<Signature>,
  ) -> impl Future<Output = Result<RecordWrite, Self::Error>> + Send + '_;

  /// The record for `date`, if any.
  fn get_record(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Option<DailyRecord>, Self::Error>> + Send + '_
  {
    async move {
      let records = self.list_records().await?;
      Ok(records.into_iter().find(|r| r.date == date))
    }
  }

  // ── Costs ─────────────────────────────────────────────────────────────

  fn list_costs(
    &self,
  ) -> impl Future<Output = Result<Vec<CostEntry>, Self::Error>> + Send + '_;

  /// Validate and append a cost entry; the store assigns its id.
  fn add_cost(
    &self,
    entry: NewCostEntry,
  ) -> impl Future<Output = Result<CostEntry, Self::Error>> + Send + '_;

  /// Remove a cost entry. Returns `false` if no entry had that id.
  fn delete_cost(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Inventory ─────────────────────────────────────────────────────────

  /// Snapshots ordered by `(year, month)`.
  fn list_inventory(
    &self,
  ) -> impl Future<Output = Result<Vec<InventorySnapshot>, Self::Error>> + Send + '_;

  /// Insert or replace the snapshot for its `(year, month)`. Returns whether
  /// one was replaced.
  fn put_inventory(
    &self,
    snapshot: InventorySnapshot,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Payroll ───────────────────────────────────────────────────────────

  fn list_payroll(
    &self,
  ) -> impl Future<Output = Result<Vec<PayrollPosition>, Self::Error>> + Send + '_;

  fn add_payroll(
    &self,
    position: NewPayrollPosition,
  ) -> impl Future<Output = Result<PayrollPosition, Self::Error>> + Send + '_;

  fn delete_payroll(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Aggregate reads ───────────────────────────────────────────────────

  /// Everything the financial statements need, read table by table.
  fn load_ledgers(
    &self,
  ) -> impl Future<Output = Result<Ledgers, Self::Error>> + Send + '_ {
    async move {
      Ok(Ledgers {
        records:   self.list_records().await?,
        costs:     self.list_costs().await?,
        inventory: self.list_inventory().await?,
        payroll:   self.list_payroll().await?,
      })
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn signature_renders_and_parses_as_etag() {
    let sig = Signature::new("abc123");
    assert_eq!(sig.to_string(), "\"abc123\"");
    assert_eq!(Signature::parse("\"abc123\""), sig);
    assert_eq!(Signature::parse("W/\"abc123\""), sig);
    assert_eq!(Signature::parse(" abc123 "), sig);
  }
}
