//! # crudkit-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **record CRUD API** at `/api/{model}` (`GET`, `POST`, `PUT`,
//!   `DELETE ?id=`) as a driving adapter over `RecordService`
//! - Map application results and errors into JSON responses with the right
//!   status codes, never leaking storage details
//! - Run the **basic-auth gate** in front of routing: in production,
//!   unauthenticated requests are rewritten to the auth fallback endpoint,
//!   which answers with a `401` challenge
//!
//! ## Dependency rule
//! Depends on `crudkit-app` (for port traits and services) and `crudkit-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod gate;
pub mod router;
pub mod state;
