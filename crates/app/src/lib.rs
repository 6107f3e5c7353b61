//! # crudkit-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define the **data-access port** that storage adapters implement:
//!   - `RecordStore` — hands out one session per operation
//!   - `RecordSession` — CRUD against the model, then an explicit release
//! - Define the **driving use-case** `RecordService` (list, create, update,
//!   delete) which guarantees that every acquired session is released
//!
//! ## Dependency rule
//! Depends on `crudkit-domain` only. Never imports adapter crates.
//! Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
