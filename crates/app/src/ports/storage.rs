//! Storage port — the data-access client the record routes talk to.
//!
//! A [`RecordStore`] is built once at startup and shared by every request.
//! Each operation borrows a [`RecordSession`] from it and must hand it back
//! with [`RecordSession::release`] once the operation is over.

use std::future::Future;

use crudkit_domain::error::CrudError;
use crudkit_domain::id::RecordId;
use crudkit_domain::record::{Fields, NewRecord, Record};

/// Long-lived handle to the data-access client.
pub trait RecordStore {
    /// Per-operation connection handed out by [`RecordStore::acquire`].
    type Session: RecordSession + Send;

    /// Borrow a session for the duration of one operation.
    fn acquire(&self) -> impl Future<Output = Result<Self::Session, CrudError>> + Send;
}

/// CRUD operations against one model, scoped to a single acquired connection.
///
/// Every method takes the model name so one store can serve several models.
pub trait RecordSession {
    /// All records of `model`, ordered by identifier.
    fn find_all(
        &mut self,
        model: &str,
    ) -> impl Future<Output = Result<Vec<Record>, CrudError>> + Send;

    /// Look up a single record.
    fn find_by_id(
        &mut self,
        model: &str,
        id: RecordId,
    ) -> impl Future<Output = Result<Option<Record>, CrudError>> + Send;

    /// Persist a new record and return it with its assigned identifier.
    fn create(
        &mut self,
        model: &str,
        record: NewRecord,
    ) -> impl Future<Output = Result<Record, CrudError>> + Send;

    /// Replace the fields of an existing record. `None` if it does not exist.
    fn update(
        &mut self,
        model: &str,
        id: RecordId,
        fields: Fields,
    ) -> impl Future<Output = Result<Option<Record>, CrudError>> + Send;

    /// Remove a record. Returns whether anything was removed.
    fn delete(
        &mut self,
        model: &str,
        id: RecordId,
    ) -> impl Future<Output = Result<bool, CrudError>> + Send;

    /// Give the connection back. Infallible from the caller's point of view.
    fn release(self) -> impl Future<Output = ()> + Send;
}
