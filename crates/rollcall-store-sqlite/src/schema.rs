//! SQL schema for the Rollcall SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision for later migrations.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Both tables are append-only.
-- No UPDATE or DELETE is ever issued against them.
-- `seq` preserves insertion order; `key` is the generated entry key.
CREATE TABLE IF NOT EXISTS users (
    seq            INTEGER PRIMARY KEY AUTOINCREMENT,
    key            TEXT NOT NULL UNIQUE,
    role           TEXT NOT NULL,   -- 'teacher' | 'student'
    name           TEXT NOT NULL,
    class          TEXT,            -- students only
    subject        TEXT,            -- teachers only
    registered_at  TEXT NOT NULL,   -- RFC 3339 UTC
    pin            TEXT NOT NULL    -- not unique
);

CREATE TABLE IF NOT EXISTS attendance (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    key        TEXT NOT NULL UNIQUE,
    role       TEXT NOT NULL,       -- 'teacher' | 'student'
    user_name  TEXT NOT NULL,
    user_id    TEXT NOT NULL,
    status     TEXT NOT NULL,       -- 'present' | 'leave' | 'sick'
    date       TEXT NOT NULL,       -- YYYY-MM-DD (UTC)
    time_in    TEXT NOT NULL,
    time_out   TEXT NOT NULL DEFAULT '',
    location   TEXT,                -- JSON-encoded Location or NULL
    photo      TEXT,                -- data: URL or NULL
    reason     TEXT,
    timestamp  TEXT NOT NULL        -- RFC 3339 UTC, fixed precision
);

CREATE INDEX IF NOT EXISTS users_role_idx           ON users(role, seq);
CREATE INDEX IF NOT EXISTS attendance_role_date_idx ON attendance(role, date);
CREATE INDEX IF NOT EXISTS attendance_role_ts_idx   ON attendance(role, timestamp);

PRAGMA user_version = 1;
";
