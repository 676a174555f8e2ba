//! Error type for `oyken-store-csv`.

use oyken_core::store::{FailureKind, Signature, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] oyken_core::Error),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  /// A table that cannot be read back: broken CSV structure, invalid UTF-8,
  /// or a key column (date, id, year/month) that does not parse.
  #[error("{file} is corrupt at line {row}: {reason}")]
  Corrupt {
    file:   String,
    row:    u64,
    reason: String,
  },

  /// The table changed since the caller last read it.
  #[error("version conflict: expected {expected}, found {actual}")]
  VersionConflict {
    expected: Signature,
    actual:   Signature,
  },
}

impl StoreError for Error {
  fn kind(&self) -> FailureKind {
    match self {
      Error::VersionConflict { .. } => FailureKind::Conflict,
      Error::Core(_) => FailureKind::Invalid,
      Error::Io(_) | Error::Csv(_) | Error::Corrupt { .. } => FailureKind::Internal,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
