//! [`SqliteLedger`] — the SQLite implementation of [`VisitLedger`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use observer_core::{
  ledger::{SubjectQuery, VisitLedger},
  subject::{Subject, Visit},
};

use crate::{
  encode::{encode_dt, encode_json, encode_uuid, RawSubject},
  schema::{SCHEMA, SELECT_BY_FINGERPRINT, SELECT_RECENT, UPSERT_VISIT},
  Result,
};

const DEFAULT_LIST_LIMIT: usize = 100;

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// A visit ledger backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Every clone
/// funnels through the same connection thread, and each visit is a single
/// upsert statement, so concurrent visits for one fingerprint serialise
/// without lost increments.
#[derive(Clone)]
pub struct SqliteLedger {
  conn: tokio_rusqlite::Connection,
}

impl SqliteLedger {
  /// Open (or create) a ledger at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let ledger = Self { conn };
    ledger.init_schema().await?;
    Ok(ledger)
  }

  /// Open an in-memory ledger — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let ledger = Self { conn };
    ledger.init_schema().await?;
    Ok(ledger)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Number of stored subjects.
  pub async fn count(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM subjects", [], |r| r.get(0))?))
      .await?;
    Ok(n.max(0) as u64)
  }
}

// ─── VisitLedger impl ────────────────────────────────────────────────────────

impl VisitLedger for SqliteLedger {
  type Error = crate::Error;

  async fn record_visit(&self, visit: Visit) -> Result<Subject> {
    // Only consumed when the fingerprint is new.
    let id_str        = encode_uuid(Uuid::new_v4());
    let fingerprint   = visit.fingerprint().to_owned();
    let network_str   = encode_json(&visit.network)?;
    let hardware_str  = encode_json(&visit.hardware)?;
    let now_str       = encode_dt(Utc::now());

    let raw: RawSubject = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          UPSERT_VISIT,
          rusqlite::params![id_str, fingerprint, network_str, hardware_str, now_str],
          RawSubject::from_row,
        )?)
      })
      .await?;

    raw.into_subject()
  }

  async fn get_subject(&self, fingerprint: &str) -> Result<Option<Subject>> {
    let fingerprint = fingerprint.to_owned();

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(SELECT_BY_FINGERPRINT, rusqlite::params![fingerprint], RawSubject::from_row)
          .optional()?)
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  async fn list_subjects(&self, query: &SubjectQuery) -> Result<Vec<Subject>> {
    let limit_val  = i64::try_from(query.limit.unwrap_or(DEFAULT_LIST_LIMIT)).unwrap_or(i64::MAX);
    let offset_val = i64::try_from(query.offset.unwrap_or(0)).unwrap_or(i64::MAX);

    let raws: Vec<RawSubject> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(SELECT_RECENT)?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val, offset_val], RawSubject::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubject::into_subject).collect()
  }
}
