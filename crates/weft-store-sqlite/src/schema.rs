//! SQL schema for the Weft SQLite store.
//!
//! Run on every open. `user_version` records the layout for later
//! migrations.

/// Full schema DDL. Safe to run against an existing database.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per shared resource. `share_public` and `share_access` are always
-- rewritten wholesale; nothing merges into them.
CREATE TABLE IF NOT EXISTS resources (
    resource_id   TEXT PRIMARY KEY,
    kind          TEXT NOT NULL,              -- 'workflow' | 'template' | 'macro'
    owner_id      TEXT NOT NULL,              -- set on insert, never updated
    name          TEXT NOT NULL,
    category      TEXT,
    content_json  TEXT NOT NULL,
    share_public  TEXT NOT NULL,              -- JSON-encoded PublicShare
    share_access  TEXT NOT NULL DEFAULT '[]', -- JSON array of RoleBinding
    revision      INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL,              -- ISO 8601 UTC
    updated_at    TEXT NOT NULL               -- ISO 8601 UTC
);

CREATE INDEX IF NOT EXISTS resources_owner_idx   ON resources(owner_id);
CREATE INDEX IF NOT EXISTS resources_kind_idx    ON resources(kind);
CREATE INDEX IF NOT EXISTS resources_updated_idx ON resources(updated_at);

PRAGMA user_version = 1;
";
