//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod auth;
#[allow(clippy::missing_errors_doc)]
pub mod records;

use axum::Router;
use axum::routing::get;

use crudkit_app::ports::RecordStore;

use crate::state::AppState;

/// Build the record sub-router, to be nested under `/api/{model}`.
pub fn routes<S>() -> Router<AppState<S>>
where
    S: RecordStore + Send + Sync + 'static,
{
    Router::new().route(
        "/",
        get(records::list::<S>)
            .post(records::create::<S>)
            .put(records::update::<S>)
            .delete(records::delete::<S>),
    )
}
