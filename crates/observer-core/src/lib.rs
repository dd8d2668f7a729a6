//! Core types for the observer: device fingerprinting and the visit ledger
//! abstraction.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! fingerprint generator and classifier are pure functions; persistence is
//! behind [`ledger::VisitLedger`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod classify;
pub mod descriptor;
pub mod error;
pub mod fingerprint;
pub mod ledger;
pub mod subject;
pub mod telemetry;

pub use error::{Error, Result};
pub use fingerprint::{Fingerprint, compute_fingerprint};
