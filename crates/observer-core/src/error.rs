//! Error types for `observer-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A visit was submitted without an identity hash.
  #[error("identity hash required")]
  MissingFingerprint,

  #[error("malformed fingerprint: {0:?}")]
  MalformedFingerprint(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
