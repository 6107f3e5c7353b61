//! Record service — use-cases behind the CRUD routes.
//!
//! Every use-case follows the same shape: validate the input, acquire a
//! session, run the operation, release the session. The release happens on
//! both the success and the error path, exactly once.

use serde_json::Value;

use crudkit_domain::error::{CrudError, NotFoundError};
use crudkit_domain::id::RecordId;
use crudkit_domain::model::ModelSchema;
use crudkit_domain::record::{NewRecord, Record, RecordPatch};

use crate::ports::{RecordSession, RecordStore};

/// Application service for record CRUD operations on a single model.
pub struct RecordService<S> {
    store: S,
    schema: ModelSchema,
}

impl<S: RecordStore> RecordService<S> {
    /// Create a new service backed by the given store.
    pub fn new(store: S, schema: ModelSchema) -> Self {
        Self { store, schema }
    }

    /// The model this service is bound to.
    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    /// List every record of the model.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn list_records(&self) -> Result<Vec<Record>, CrudError> {
        let mut session = self.store.acquire().await?;
        let result = session.find_all(self.schema.name()).await;
        finish(session, "list", result).await
    }

    /// Validate `body` and persist it as a new record.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::Validation`] without touching the store when the
    /// body is not an object or lacks the required field, or a storage error.
    pub async fn create_record(&self, body: Value) -> Result<Record, CrudError> {
        let new = NewRecord::parse(body, &self.schema)?;
        let mut session = self.store.acquire().await?;
        let result = session.create(self.schema.name(), new).await;
        finish(session, "create", result).await
    }

    /// Apply a partial update. `body` must carry the target `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::Validation`] when `id` is missing or malformed or
    /// the merged record loses its required field,
    /// [`CrudError::NotFound`] when no record has that `id`, or a storage error.
    pub async fn update_record(&self, body: Value) -> Result<Record, CrudError> {
        let patch = RecordPatch::parse(body)?;
        let mut session = self.store.acquire().await?;
        let result = apply_patch(&mut session, &self.schema, &patch).await;
        finish(session, "update", result).await
    }

    /// Delete a record by id.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::NotFound`] when no record has that `id`, or a
    /// storage error.
    pub async fn delete_record(&self, id: RecordId) -> Result<(), CrudError> {
        let mut session = self.store.acquire().await?;
        let result = match session.delete(self.schema.name(), id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(not_found(id)),
            Err(err) => Err(err),
        };
        finish(session, "delete", result).await
    }
}

async fn apply_patch<T: RecordSession>(
    session: &mut T,
    schema: &ModelSchema,
    patch: &RecordPatch,
) -> Result<Record, CrudError> {
    let id = patch.id();
    let current = session
        .find_by_id(schema.name(), id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let merged = patch.apply(&current.fields, schema)?;
    session
        .update(schema.name(), id, merged)
        .await?
        .ok_or_else(|| not_found(id))
}

async fn finish<T, R: RecordSession>(
    session: R,
    operation: &'static str,
    result: Result<T, CrudError>,
) -> Result<T, CrudError> {
    if let Err(err) = &result {
        tracing::warn!(operation, error = %err, "record operation failed");
    }
    session.release().await;
    result
}

fn not_found(id: RecordId) -> CrudError {
    NotFoundError {
        entity: "Record",
        id: id.to_string(),
    }
    .into()
}
