//! JSON REST API for Oyken.
//!
//! Exposes an axum [`Router`] backed by any
//! [`oyken_core::store::OperationsStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", oyken_api::api_router(state))
//! ```

pub mod comparison;
pub mod costs;
pub mod error;
pub mod inventory;
pub mod payroll;
pub mod records;
pub mod statements;
pub mod totals;

mod params;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, put},
};
use chrono::NaiveDate;
use oyken_core::{
  clock::{Clock, RequestContext},
  statement::StatementConfig,
  store::OperationsStore,
};

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:     Arc<S>,
  pub clock:     Arc<dyn Clock>,
  pub statement: Arc<StatementConfig>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      clock:     Arc::clone(&self.clock),
      statement: Arc::clone(&self.statement),
    }
  }
}

impl<S> ApiState<S> {
  pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, statement: StatementConfig) -> Self {
    Self {
      store,
      clock,
      statement: Arc::new(statement),
    }
  }

  /// The request context for an optionally selected date.
  pub fn context(&self, selected: Option<NaiveDate>) -> RequestContext {
    RequestContext::new(self.clock.as_ref(), selected)
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: OperationsStore + 'static,
{
  Router::new()
    // Daily records
    .route("/records", get(records::list::<S>))
    .route("/records/{date}", get(records::get_one::<S>).put(records::put_one::<S>))
    // Reports
    .route("/comparison", get(comparison::handler::<S>))
    .route("/totals", get(totals::handler::<S>))
    .route("/statements/income", get(statements::income::<S>))
    .route("/statements/breakeven", get(statements::breakeven::<S>))
    // Ledgers
    .route("/costs", get(costs::list::<S>).post(costs::create::<S>))
    .route("/costs/{id}", delete(costs::delete_one::<S>))
    .route("/inventory", get(inventory::list::<S>))
    .route("/inventory/{year}/{month}", put(inventory::put_one::<S>))
    .route("/payroll", get(payroll::list::<S>).post(payroll::create::<S>))
    .route("/payroll/{id}", delete(payroll::delete_one::<S>))
    .with_state(state)
}
