//! SQL DDL for initializing persistent storage.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - `api_keys`: provider credentials, one valid row per (provider, user
///   scope); superseded rows keep `is_valid = 0` for audit
/// - `qa_pairs`: recorded question/answer exchanges, looked up by URL
/// - `is_valid` BOOLEAN stored as INTEGER 0/1
/// - timestamps stored as RFC3339 TEXT
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS api_keys (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    key TEXT NOT NULL,
    provider TEXT NOT NULL,
    model TEXT NOT NULL,
    user_id TEXT NULL,
    is_valid INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_api_keys_scope ON api_keys(provider, user_id, is_valid);

CREATE TABLE IF NOT EXISTS qa_pairs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    webpage_url TEXT NOT NULL,
    question TEXT NOT NULL,
    answer TEXT NOT NULL,
    context TEXT NULL,
    created_by TEXT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_qa_pairs_webpage_url ON qa_pairs(webpage_url);
"#;
