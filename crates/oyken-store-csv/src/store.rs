//! [`CsvStore`]: the flat-file implementation of [`OperationsStore`].

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
  sync::Arc,
};

use oyken_core::{
  ledger::{
    CostEntry, InventorySnapshot, NewCostEntry, NewPayrollPosition,
    PayrollPosition, dedupe_snapshots,
  },
  record::{DailyRecord, dedupe_by_date, upsert},
  store::{OperationsStore, RecordWrite, Signature},
};
use sha2::{Digest, Sha256};
use tokio::{io::AsyncWriteExt as _, sync::Mutex};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{Row, TableRow},
  schema::Table,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Oyken store backed by CSV files in one directory.
///
/// Cloning is cheap; clones share the write lock, so writes made through any
/// clone are serialised.
#[derive(Clone)]
pub struct CsvStore {
  dir:   PathBuf,
  write: Arc<Mutex<()>>,
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

/// SHA-256 of `bytes`, hex-encoded.
pub fn signature_of(bytes: &[u8]) -> Signature {
  Signature::new(hex::encode(Sha256::digest(bytes)))
}

impl CsvStore {
  /// Open a store rooted at `dir`, creating the directory if needed. A
  /// leading `~/` is expanded. Tables are created lazily on first write.
  pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
    let dir = expand_tilde(dir.as_ref());
    tokio::fs::create_dir_all(&dir).await?;
    tracing::debug!(dir = %dir.display(), "opened csv store");
    Ok(Self {
      dir,
      write: Arc::new(Mutex::new(())),
    })
  }

  pub fn dir(&self) -> &Path { &self.dir }

  fn path(&self, table: &Table) -> PathBuf { self.dir.join(table.file) }

  /// Raw bytes of a table; a missing file reads as empty.
  async fn read_bytes(&self, table: &Table) -> Result<Vec<u8>> {
    match tokio::fs::read(self.path(table)).await {
      Ok(bytes) => Ok(bytes),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
      Err(e) => Err(e.into()),
    }
  }

  async fn load<T: TableRow>(&self) -> Result<(Vec<T>, Signature)> {
    let bytes = self.read_bytes(T::TABLE).await?;
    let signature = signature_of(&bytes);
    Ok((parse(&bytes)?, signature))
  }

  /// Replace a table with `rows`: write to a temporary sibling, flush to
  /// disk, then rename over the original.
  async fn save<T: TableRow>(&self, rows: &[T]) -> Result<Signature> {
    let table = T::TABLE;
    let bytes = render(rows)?;

    let target = self.path(table);
    let temp = self
      .dir
      .join(format!(".{}.{}.tmp", table.file, Uuid::new_v4().simple()));
    let mut file = tokio::fs::File::create(&temp).await?;
    file.write_all(&bytes).await?;
    file.sync_all().await?;
    drop(file);
    if let Err(e) = tokio::fs::rename(&temp, &target).await {
      let _ = tokio::fs::remove_file(&temp).await;
      return Err(e.into());
    }

    tracing::debug!(file = table.file, rows = rows.len(), "table written");
    Ok(signature_of(&bytes))
  }
}

fn parse<T: TableRow>(bytes: &[u8]) -> Result<Vec<T>> {
  let table = T::TABLE;
  if bytes.is_empty() {
    return Ok(Vec::new());
  }

  let mut reader = csv::ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .from_reader(bytes);
  let corrupt = |line: u64, e: csv::Error| Error::Corrupt {
    file:   table.file.to_owned(),
    row:    line,
    reason: e.to_string(),
  };

  let headers = reader.headers().map_err(|e| corrupt(1, e))?.clone();
  let mut rows = Vec::new();
  for (i, result) in reader.records().enumerate() {
    // Header is line 1.
    let fallback_line = i as u64 + 2;
    let record = result.map_err(|e| {
      let line = e.position().map_or(fallback_line, |p| p.line());
      corrupt(line, e)
    })?;
    if record.iter().all(|cell| cell.trim().is_empty()) {
      continue;
    }
    let line = record.position().map_or(fallback_line, |p| p.line());
    rows.push(T::decode(&Row {
      table,
      line,
      headers: &headers,
      record: &record,
    })?);
  }
  Ok(rows)
}

fn render<T: TableRow>(rows: &[T]) -> Result<Vec<u8>> {
  let mut writer = csv::WriterBuilder::new()
    .terminator(csv::Terminator::Any(b'\n'))
    .from_writer(Vec::new());
  writer.write_record(T::TABLE.columns)?;
  for row in rows {
    writer.write_record(row.encode())?;
  }
  writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}

// ─── OperationsStore impl ────────────────────────────────────────────────────

impl OperationsStore for CsvStore {
  type Error = Error;

  async fn list_records(&self) -> Result<Vec<DailyRecord>> {
    let (rows, _) = self.load::<DailyRecord>().await?;
    let read = rows.len();
    let records = dedupe_by_date(rows);
    if records.len() != read {
      tracing::debug!(
        read,
        kept = records.len(),
        "collapsed daily records sharing a date"
      );
    }
    Ok(records)
  }

  async fn records_signature(&self) -> Result<Signature> {
    let bytes = self.read_bytes(<DailyRecord as TableRow>::TABLE).await?;
    Ok(signature_of(&bytes))
  }

  async fn put_record(
    &self,
    record: DailyRecord,
    expected: Option<Signature>,
  ) -> Result<RecordWrite> {
    let _guard = self.write.lock().await;

    let (rows, actual) = self.load::<DailyRecord>().await?;
    match expected {
      Some(expected) if expected != actual => {
        return Err(Error::VersionConflict { expected, actual });
      }
      _ => {}
    }

    let (records, replaced) = upsert(rows, record.clone());
    let signature = self.save(&records).await?;
    tracing::info!(date = %record.date, replaced, "daily record saved");
    Ok(RecordWrite {
      record,
      replaced,
      signature,
    })
  }

  async fn list_costs(&self) -> Result<Vec<CostEntry>> {
    let (mut costs, _) = self.load::<CostEntry>().await?;
    costs.sort_by_key(|c| c.date);
    Ok(costs)
  }

  async fn add_cost(&self, entry: NewCostEntry) -> Result<CostEntry> {
    let entry = entry.into_entry(Uuid::new_v4())?;
    let _guard = self.write.lock().await;
    let (mut costs, _) = self.load::<CostEntry>().await?;
    costs.push(entry.clone());
    self.save(&costs).await?;
    tracing::info!(id = %entry.id, source = %entry.source, "cost entry added");
    Ok(entry)
  }

  async fn delete_cost(&self, id: Uuid) -> Result<bool> {
    let _guard = self.write.lock().await;
    let (mut costs, _) = self.load::<CostEntry>().await?;
    let before = costs.len();
    costs.retain(|c| c.id != id);
    if costs.len() == before {
      return Ok(false);
    }
    self.save(&costs).await?;
    tracing::info!(%id, "cost entry deleted");
    Ok(true)
  }

  async fn list_inventory(&self) -> Result<Vec<InventorySnapshot>> {
    let (rows, _) = self.load::<InventorySnapshot>().await?;
    Ok(dedupe_snapshots(rows))
  }

  async fn put_inventory(&self, snapshot: InventorySnapshot) -> Result<bool> {
    let _guard = self.write.lock().await;
    let (rows, _) = self.load::<InventorySnapshot>().await?;
    let replaced = rows.iter().any(|s| s.key() == snapshot.key());
    let (year, month) = snapshot.key();
    let snapshots = dedupe_snapshots(rows.into_iter().chain(std::iter::once(snapshot)));
    self.save(&snapshots).await?;
    tracing::info!(year, month, replaced, "inventory snapshot saved");
    Ok(replaced)
  }

  async fn list_payroll(&self) -> Result<Vec<PayrollPosition>> {
    let (mut positions, _) = self.load::<PayrollPosition>().await?;
    positions.sort_by_key(|p| p.year);
    Ok(positions)
  }

  async fn add_payroll(&self, position: NewPayrollPosition) -> Result<PayrollPosition> {
    let position = position.into_position(Uuid::new_v4())?;
    let _guard = self.write.lock().await;
    let (mut positions, _) = self.load::<PayrollPosition>().await?;
    positions.push(position.clone());
    self.save(&positions).await?;
    tracing::info!(id = %position.id, title = %position.title, "payroll position added");
    Ok(position)
  }

  async fn delete_payroll(&self, id: Uuid) -> Result<bool> {
    let _guard = self.write.lock().await;
    let (mut positions, _) = self.load::<PayrollPosition>().await?;
    let before = positions.len();
    positions.retain(|p| p.id != id);
    if positions.len() == before {
      return Ok(false);
    }
    self.save(&positions).await?;
    tracing::info!(%id, "payroll position deleted");
    Ok(true)
  }
}
