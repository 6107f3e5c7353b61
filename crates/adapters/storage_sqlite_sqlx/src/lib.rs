//! # crudkit-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Own the process-wide data-access client: one connection pool, built once
//!   by the composition root and shared by handle
//! - Run database migrations (sqlx embedded migrations)
//! - Implement the `RecordStore` / `RecordSession` ports from `crudkit-app`
//! - Map between domain records and database rows
//!
//! ## Dependency rule
//! Depends on `crudkit-app` (for port traits) and `crudkit-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod pool;
mod record_store;

pub use error::StorageError;
pub use pool::{Config, Database};
pub use record_store::{SqliteRecordSession, SqliteRecordStore};
