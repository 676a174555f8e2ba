//! Core types and pure calculations for the Oyken operations dashboard.
//!
//! This crate is deliberately free of HTTP and file-system dependencies. The
//! comparable-period resolver, the variance calculator and the statement
//! builders are plain functions over in-memory data; storage backends
//! implement [`store::OperationsStore`].

pub mod aggregate;
pub mod calendar;
pub mod clock;
pub mod comparison;
pub mod error;
pub mod ledger;
pub mod money;
pub mod record;
pub mod resolver;
pub mod statement;
pub mod store;
pub mod variance;

pub use error::{Error, Result};
pub use money::Cents;
