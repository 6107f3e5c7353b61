//! # crudkit-domain
//!
//! Pure domain model for crudkit's generic CRUD service.
//!
//! ## Responsibilities
//! - Foundational types: the record identifier and the error conventions
//! - Define the **Record** (an identifier plus arbitrary JSON fields)
//! - Define the **Model schema** (collection name and designated required field)
//! - Validate create and update input before anything touches storage
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod model;
pub mod record;
