//! SQL schema for the person card cache.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! layout so a later change can be detected and migrated.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per directory entity; rewritten on every network fetch.
CREATE TABLE IF NOT EXISTS person_cards (
    entity_id   TEXT PRIMARY KEY,
    state_json  TEXT NOT NULL,   -- serialised CardState, section-keyed
    cached_at   TEXT NOT NULL    -- ISO 8601 UTC
);

PRAGMA user_version = 1;
";
