//! The `VisitLedger` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `observer-store-sqlite`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::subject::{Subject, Visit};

/// Parameters for [`VisitLedger::list_subjects`].
#[derive(Debug, Clone, Default)]
pub struct SubjectQuery {
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// Abstraction over a visit ledger backend.
///
/// [`record_visit`](VisitLedger::record_visit) is the only mutation, and it
/// must be atomic per fingerprint: concurrent visits for one fingerprint
/// produce exactly one record and lose no increments.
pub trait VisitLedger: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert-or-increment the record for `visit.fingerprint()` and return it
  /// as stored after the write.
  ///
  /// A new record starts at `visit_count = 1` with `first_seen = last_seen =
  /// now`. An existing one gains exactly one visit, a fresh `last_seen`, and
  /// the given snapshots; `first_seen` and `id` are untouched.
  fn record_visit(
    &self,
    visit: Visit,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  /// Look up a record by fingerprint. Returns `None` if never seen.
  fn get_subject<'a>(
    &'a self,
    fingerprint: &'a str,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + 'a;

  /// List records, most recently seen first.
  fn list_subjects<'a>(
    &'a self,
    query: &'a SubjectQuery,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + 'a;
}
