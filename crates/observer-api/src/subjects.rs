//! Handlers for `/subjects` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/subjects` | Optional `?limit=&offset=`; most recently seen first |
//! | `GET`  | `/subjects/:fingerprint` | 404 if never seen |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use observer_core::{
  ledger::{SubjectQuery, VisitLedger},
  subject::Subject,
};
use serde::Deserialize;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /subjects[?limit=<n>][&offset=<n>]`
pub async fn list<L>(
  State(ledger): State<Arc<L>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Subject>>, ApiError>
where
  L: VisitLedger,
{
  let query = SubjectQuery { limit: params.limit, offset: params.offset };
  let subjects = ledger.list_subjects(&query).await.map_err(ApiError::ledger)?;
  Ok(Json(subjects))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /subjects/:fingerprint`
pub async fn get_one<L>(
  State(ledger): State<Arc<L>>,
  Path(fingerprint): Path<String>,
) -> Result<Json<Subject>, ApiError>
where
  L: VisitLedger,
{
  let subject = ledger
    .get_subject(&fingerprint)
    .await
    .map_err(ApiError::ledger)?
    .ok_or_else(|| ApiError::NotFound(format!("subject {fingerprint} not found")))?;
  Ok(Json(subject))
}
