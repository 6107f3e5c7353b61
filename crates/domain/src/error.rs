//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`CrudError`]
//! via `From`, so the HTTP adapter only has one type to map.

/// Top-level error returned by services and ports.
#[derive(Debug, thiserror::Error)]
pub enum CrudError {
    /// Input was rejected before reaching storage.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The addressed record does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The data-access client failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Rejected input. The `Display` text is sent back to HTTP clients verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Required field is missing")]
    MissingRequiredField,

    #[error("Identifier is missing")]
    MissingIdentifier,

    #[error("Identifier is invalid")]
    InvalidIdentifier,

    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Model name must be non-empty and use only letters, digits, `_` or `-`")]
    InvalidModelName,

    #[error("Required field name must be non-empty and not reserved")]
    InvalidRequiredField,
}

/// A lookup by identifier matched nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
