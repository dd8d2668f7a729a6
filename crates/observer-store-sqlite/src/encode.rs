//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings with a `Z` suffix so
//! that lexical order is chronological. Snapshots are stored as compact JSON.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use observer_core::subject::Subject;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Snapshots ────────────────────────────────────────────────────────────────

pub fn encode_json(v: &serde_json::Value) -> Result<String> { Ok(serde_json::to_string(v)?) }

pub fn decode_json(s: &str) -> Result<serde_json::Value> { Ok(serde_json::from_str(s)?) }

// ─── Raw row ──────────────────────────────────────────────────────────────────

/// A `subjects` row as read from SQLite, before decoding.
pub struct RawSubject {
  pub subject_id:    String,
  pub fingerprint:   String,
  pub network_json:  String,
  pub hardware_json: String,
  pub visit_count:   i64,
  pub first_seen:    String,
  pub last_seen:     String,
}

impl RawSubject {
  /// Column order matches every `SELECT`/`RETURNING` list in the schema.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      subject_id:    row.get(0)?,
      fingerprint:   row.get(1)?,
      network_json:  row.get(2)?,
      hardware_json: row.get(3)?,
      visit_count:   row.get(4)?,
      first_seen:    row.get(5)?,
      last_seen:     row.get(6)?,
    })
  }

  pub fn into_subject(self) -> Result<Subject> {
    let visit_count = u64::try_from(self.visit_count).map_err(|e| Error::Corrupt {
      column: "visit_count",
      detail: e.to_string(),
    })?;
    Ok(Subject {
      id: decode_uuid(&self.subject_id)?,
      fingerprint: self.fingerprint,
      network: decode_json(&self.network_json)?,
      hardware: decode_json(&self.hardware_json)?,
      visit_count,
      first_seen: decode_dt(&self.first_seen)?,
      last_seen: decode_dt(&self.last_seen)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let a = encode_dt(DateTime::parse_from_rfc3339("2026-10-19T10:00:00Z").unwrap().into());
    let b = encode_dt(DateTime::parse_from_rfc3339("2026-10-19T10:00:00.5Z").unwrap().into());
    assert_eq!(a, "2026-10-19T10:00:00.000000Z");
    assert!(a < b);
    assert_eq!(decode_dt(&b).unwrap().to_rfc3339(), "2026-10-19T10:00:00.500+00:00");
  }

  #[test]
  fn negative_visit_count_is_corrupt() {
    let raw = RawSubject {
      subject_id:    Uuid::nil().to_string(),
      fingerprint:   "UID-AAAAAAAA".into(),
      network_json:  "null".into(),
      hardware_json: "null".into(),
      visit_count:   -1,
      first_seen:    "2026-10-19T10:00:00.000000Z".into(),
      last_seen:     "2026-10-19T10:00:00.000000Z".into(),
    };
    assert!(matches!(raw.into_subject(), Err(Error::Corrupt { column: "visit_count", .. })));
  }
}
