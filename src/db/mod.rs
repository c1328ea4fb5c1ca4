//! Database module: models, schema, and stores for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: pool-backed stores for credentials and Q&A pairs

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{ApiKeyRecord, QaPairRecord};
pub use schema::SQLITE_INIT;
pub use sqlite::{CredentialStore, QaStore, SqlitePool, init_schema};
