//! Subject — the server-side record of one fingerprinted device.
//!
//! One record exists per fingerprint. It is created on the first sync and
//! mutated in place on every later one; nothing ever deletes it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A stored subject record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
  /// Assigned on first insert; never changes.
  pub id:          Uuid,
  pub fingerprint: String,
  /// Last-seen network snapshot, stored as received.
  pub network:     serde_json::Value,
  /// Last-seen hardware snapshot, stored as received.
  pub hardware:    serde_json::Value,
  /// 1 after the first sync, +1 on each later one.
  pub visit_count: u64,
  pub first_seen:  DateTime<Utc>,
  pub last_seen:   DateTime<Utc>,
}

impl Subject {
  pub fn is_returning(&self) -> bool { self.visit_count > 1 }
}

/// Input to [`crate::ledger::VisitLedger::record_visit`].
///
/// Holding a `Visit` guarantees the fingerprint is present; the snapshots are
/// trusted as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct Visit {
  fingerprint:  String,
  pub network:  serde_json::Value,
  pub hardware: serde_json::Value,
}

impl Visit {
  /// Returns [`Error::MissingFingerprint`] if `fingerprint` is absent or
  /// blank.
  pub fn new(
    fingerprint: Option<String>,
    network: serde_json::Value,
    hardware: serde_json::Value,
  ) -> Result<Self> {
    let fingerprint = fingerprint
      .filter(|f| !f.trim().is_empty())
      .ok_or(Error::MissingFingerprint)?;
    Ok(Self { fingerprint, network, hardware })
  }

  pub fn fingerprint(&self) -> &str { &self.fingerprint }
}
