//! Handler for `POST /telemetry` — the visit upsert.
//!
//! Body: `{"fingerprint": "...", "network": {...}, "hardware": {...}}`.
//! Only the fingerprint is checked; the snapshots are stored as received.

use std::sync::Arc;

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use observer_core::{
  ledger::VisitLedger,
  subject::Visit,
  telemetry::TelemetryResponse,
};
use serde::Deserialize;

use crate::error::ApiError;

/// Lenient request body: every field may be absent.
#[derive(Debug, Deserialize)]
pub struct TelemetryBody {
  #[serde(default)]
  pub fingerprint: Option<String>,
  #[serde(default)]
  pub network:     serde_json::Value,
  #[serde(default)]
  pub hardware:    serde_json::Value,
}

/// `POST /telemetry` — 200 with the post-upsert visit count, 400 when the
/// fingerprint is missing, 500 when the ledger fails.
pub async fn record<L>(
  State(ledger): State<Arc<L>>,
  body: Result<Json<TelemetryBody>, JsonRejection>,
) -> Result<Json<TelemetryResponse>, ApiError>
where
  L: VisitLedger,
{
  let Json(body) = body?;
  let visit = Visit::new(body.fingerprint, body.network, body.hardware)?;

  let subject = ledger.record_visit(visit).await.map_err(ApiError::ledger)?;

  tracing::info!(
    fingerprint = %subject.fingerprint,
    visit_count = subject.visit_count,
    "telemetry handshake"
  );

  Ok(Json(TelemetryResponse {
    success:     true,
    visit_count: subject.visit_count,
    id:          subject.id.to_string(),
  }))
}
