//! Record — the generic row served by the CRUD routes.
//!
//! Only the identifier and the timestamps are structured. Everything else is
//! an arbitrary JSON object whose shape is left to the model's owner.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{CrudError, ValidationError};
use crate::id::RecordId;
use crate::model::ModelSchema;

/// UTC timestamp used for `createdAt` and `updatedAt`.
pub type Timestamp = DateTime<Utc>;

/// User-supplied fields of a record.
pub type Fields = Map<String, Value>;

/// Keys managed by the store. Clients cannot write them as fields.
pub const RESERVED_KEYS: [&str; 3] = ["id", "createdAt", "updatedAt"];

/// A persisted record.
///
/// Serializes flat: `{"id": 1, "requiredField": "x", …, "createdAt": …}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: Fields,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Validated input for creating a record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    fields: Fields,
}

impl NewRecord {
    /// Validate a decoded request body against `schema`.
    ///
    /// Reserved keys are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotAnObject`] if `body` is not a JSON object,
    /// or [`ValidationError::MissingRequiredField`].
    pub fn parse(body: Value, schema: &ModelSchema) -> Result<Self, CrudError> {
        let mut fields = into_object(body)?;
        strip_reserved(&mut fields);
        schema.check(&fields)?;
        Ok(Self { fields })
    }

    #[must_use]
    pub fn fields(&self) -> &Fields {
        &self.fields
    }
}

/// Validated input for a partial update.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPatch {
    id: RecordId,
    fields: Fields,
}

impl RecordPatch {
    /// Split a decoded request body into the target identifier and the
    /// fields to overwrite.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotAnObject`],
    /// [`ValidationError::MissingIdentifier`] when `id` is absent or null, or
    /// [`ValidationError::InvalidIdentifier`] when it does not parse.
    pub fn parse(body: Value) -> Result<Self, CrudError> {
        let mut fields = into_object(body)?;
        let id = match fields.remove("id") {
            None | Some(Value::Null) => return Err(ValidationError::MissingIdentifier.into()),
            Some(raw) => RecordId::try_from(&raw)?,
        };
        strip_reserved(&mut fields);
        Ok(Self { id, fields })
    }

    #[must_use]
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Shallow-merge the patch over `current` and re-check the schema.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingRequiredField`] if the patch nulls
    /// out the required field.
    pub fn apply(&self, current: &Fields, schema: &ModelSchema) -> Result<Fields, CrudError> {
        let mut merged = current.clone();
        for (key, value) in &self.fields {
            merged.insert(key.clone(), value.clone());
        }
        schema.check(&merged)?;
        Ok(merged)
    }
}

fn into_object(body: Value) -> Result<Fields, ValidationError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(ValidationError::NotAnObject),
    }
}

fn strip_reserved(fields: &mut Fields) {
    for key in RESERVED_KEYS {
        fields.remove(key);
    }
}
