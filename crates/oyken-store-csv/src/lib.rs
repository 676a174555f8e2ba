//! Flat-file backend for the Oyken operations store.
//!
//! Each table is one CSV file in a data directory. Tables are read in full and
//! rewritten in full; a write lands in a temporary file that is then renamed
//! over the table, so readers never observe a partial file.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::CsvStore;
