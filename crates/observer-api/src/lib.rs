//! JSON HTTP API for the observer visit ledger.
//!
//! Exposes an axum [`Router`] backed by any [`observer_core::ledger::VisitLedger`].
//! CORS, tracing, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", observer_api::api_router(ledger.clone()))
//! ```

pub mod error;
pub mod subjects;
pub mod telemetry;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use observer_core::ledger::VisitLedger;

pub use error::ApiError;

/// Build a fully-materialised API router for `ledger`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<L>(ledger: Arc<L>) -> Router<()>
where
  L: VisitLedger + 'static,
{
  Router::new()
    .route("/telemetry", post(telemetry::record::<L>))
    .route("/subjects", get(subjects::list::<L>))
    .route("/subjects/{fingerprint}", get(subjects::get_one::<L>))
    .with_state(ledger)
}
