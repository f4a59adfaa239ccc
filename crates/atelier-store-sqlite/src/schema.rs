//! SQL schema for the Atelier SQLite store.
//!
//! Every collection shares one `documents` table. The record body is JSON;
//! identity, schema version and server timestamps are columns.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- rowid is kept stable across updates (upserts never REPLACE) and breaks
-- ties in every ordered query.
CREATE TABLE IF NOT EXISTS documents (
    collection     TEXT    NOT NULL,
    doc_id         TEXT    NOT NULL,
    body           TEXT    NOT NULL,   -- JSON object
    schema_version INTEGER NOT NULL,
    created_at     TEXT    NOT NULL,   -- RFC 3339 UTC, fixed width; server-assigned
    updated_at     TEXT    NOT NULL,
    PRIMARY KEY (collection, doc_id)
);

CREATE INDEX IF NOT EXISTS documents_created_idx ON documents(collection, created_at);

PRAGMA user_version = 1;
";
