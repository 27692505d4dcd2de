//! SQL schema for the cue SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- User lifecycle belongs to the surrounding account-management layer;
-- this store only reads users when resolving rule ownership.
CREATE TABLE IF NOT EXISTS users (
    user_id  INTEGER PRIMARY KEY,
    username TEXT NOT NULL,
    email    TEXT NOT NULL
);

-- Calendar entries a rule can attach to. The (event_id, calendar_id) pair
-- comes from the surrounding calendar system and is only unique per user.
CREATE TABLE IF NOT EXISTS events (
    event_id    INTEGER NOT NULL,
    calendar_id INTEGER NOT NULL,
    user_id     INTEGER NOT NULL REFERENCES users(user_id),
    title       TEXT NOT NULL,
    PRIMARY KEY (event_id, calendar_id, user_id)
);

CREATE TABLE IF NOT EXISTS locations (
    location_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(user_id),
    name        TEXT NOT NULL,
    latitude    REAL NOT NULL,
    longitude   REAL NOT NULL,
    radius      REAL NOT NULL
);

-- One table for both rule kinds; `kind` selects which subject columns
-- apply. Per-user listings return rows in rule_id order, which is
-- insertion order.
CREATE TABLE IF NOT EXISTS rules (
    rule_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(user_id),
    kind        TEXT NOT NULL CHECK (kind IN ('event', 'location')),
    starts_at   TEXT NOT NULL,   -- RFC 3339 UTC
    ends_at     TEXT NOT NULL,   -- RFC 3339 UTC
    event_id    INTEGER,
    calendar_id INTEGER,
    location_id INTEGER REFERENCES locations(location_id)
);

CREATE INDEX IF NOT EXISTS rules_user_idx     ON rules(user_id);
CREATE INDEX IF NOT EXISTS locations_user_idx ON locations(user_id);

PRAGMA user_version = 1;
";
