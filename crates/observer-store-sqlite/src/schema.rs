//! SQL schema for the observer SQLite ledger.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA busy_timeout = 5000;

-- One row per fingerprint. Rows are never deleted.
CREATE TABLE IF NOT EXISTS subjects (
    subject_id    TEXT PRIMARY KEY,
    fingerprint   TEXT NOT NULL UNIQUE,
    network_json  TEXT NOT NULL DEFAULT 'null',  -- last-seen snapshot, as received
    hardware_json TEXT NOT NULL DEFAULT 'null',  -- last-seen snapshot, as received
    visit_count   INTEGER NOT NULL CHECK (visit_count >= 1),
    first_seen    TEXT NOT NULL,                 -- RFC 3339 UTC; set once
    last_seen     TEXT NOT NULL                  -- RFC 3339 UTC; every sync
);

CREATE INDEX IF NOT EXISTS subjects_last_seen_idx ON subjects(last_seen);

PRAGMA user_version = 1;
";

/// Insert a first visit or bump an existing one, in one statement.
///
/// `?1` subject id (used only on insert), `?2` fingerprint, `?3` network
/// JSON, `?4` hardware JSON, `?5` timestamp.
pub const UPSERT_VISIT: &str = "
INSERT INTO subjects (
    subject_id, fingerprint, network_json, hardware_json,
    visit_count, first_seen, last_seen
) VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)
ON CONFLICT (fingerprint) DO UPDATE SET
    network_json  = excluded.network_json,
    hardware_json = excluded.hardware_json,
    visit_count   = subjects.visit_count + 1,
    last_seen     = excluded.last_seen
RETURNING
    subject_id, fingerprint, network_json, hardware_json,
    visit_count, first_seen, last_seen
";

pub const SELECT_BY_FINGERPRINT: &str = "
SELECT subject_id, fingerprint, network_json, hardware_json,
       visit_count, first_seen, last_seen
FROM subjects
WHERE fingerprint = ?1
";

pub const SELECT_RECENT: &str = "
SELECT subject_id, fingerprint, network_json, hardware_json,
       visit_count, first_seen, last_seen
FROM subjects
ORDER BY last_seen DESC, fingerprint ASC
LIMIT ?1 OFFSET ?2
";
