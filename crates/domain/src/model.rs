//! Model schema — which collection is served and which field it requires.

use crate::error::{CrudError, ValidationError};
use crate::record::{Fields, RESERVED_KEYS};

/// Describes the single model exposed by the CRUD routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSchema {
    name: String,
    required_field: String,
}

impl ModelSchema {
    /// Create a builder for constructing a [`ModelSchema`].
    #[must_use]
    pub fn builder() -> ModelSchemaBuilder {
        ModelSchemaBuilder::default()
    }

    /// Collection name, used as the URL segment and the storage partition.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the field every stored record must carry.
    #[must_use]
    pub fn required_field(&self) -> &str {
        &self.required_field
    }

    /// Check that `fields` carries a non-null value for the required field.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingRequiredField`] otherwise.
    pub fn check(&self, fields: &Fields) -> Result<(), CrudError> {
        match fields.get(&self.required_field) {
            Some(value) if !value.is_null() => Ok(()),
            _ => Err(ValidationError::MissingRequiredField.into()),
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let name_ok = !self.name.is_empty()
            && self
                .name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if !name_ok {
            return Err(ValidationError::InvalidModelName);
        }
        if self.required_field.is_empty() || RESERVED_KEYS.contains(&self.required_field.as_str())
        {
            return Err(ValidationError::InvalidRequiredField);
        }
        Ok(())
    }
}

impl Default for ModelSchema {
    fn default() -> Self {
        Self {
            name: "records".to_string(),
            required_field: "requiredField".to_string(),
        }
    }
}

/// Step-by-step builder for [`ModelSchema`].
#[derive(Debug, Default)]
pub struct ModelSchemaBuilder {
    name: Option<String>,
    required_field: Option<String>,
}

impl ModelSchemaBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn required_field(mut self, field: impl Into<String>) -> Self {
        self.required_field = Some(field.into());
        self
    }

    /// Consume the builder, validate, and return a [`ModelSchema`].
    ///
    /// Unset values fall back to [`ModelSchema::default`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidModelName`] or
    /// [`ValidationError::InvalidRequiredField`].
    pub fn build(self) -> Result<ModelSchema, ValidationError> {
        let defaults = ModelSchema::default();
        let schema = ModelSchema {
            name: self.name.unwrap_or(defaults.name),
            required_field: self.required_field.unwrap_or(defaults.required_field),
        };
        schema.validate()?;
        Ok(schema)
    }
}
