//! JSON REST handlers for the model's records.

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crudkit_app::ports::RecordStore;
use crudkit_domain::error::ValidationError;
use crudkit_domain::id::RecordId;
use crudkit_domain::record::Record;

use crate::error::ApiError;
use crate::state::AppState;

/// Query string of the delete endpoint.
#[derive(Deserialize)]
pub struct DeleteQuery {
    pub id: Option<String>,
}

/// Confirmation body returned after a delete.
#[derive(Serialize)]
pub struct DeletedBody {
    pub message: &'static str,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Record>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Record>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the update endpoint.
pub enum UpdateResponse {
    Ok(Json<Record>),
}

impl IntoResponse for UpdateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    Ok(Json<DeletedBody>),
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/{model}`
pub async fn list<S>(State(state): State<AppState<S>>) -> Result<ListResponse, ApiError>
where
    S: RecordStore + Send + Sync + 'static,
{
    let records = state.record_service.list_records().await?;
    Ok(ListResponse::Ok(Json(records)))
}

/// `POST /api/{model}`
pub async fn create<S>(
    State(state): State<AppState<S>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<CreateResponse, ApiError>
where
    S: RecordStore + Send + Sync + 'static,
{
    let body = parse_body(&body?)?;
    let created = state.record_service.create_record(body).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/{model}`
pub async fn update<S>(
    State(state): State<AppState<S>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<UpdateResponse, ApiError>
where
    S: RecordStore + Send + Sync + 'static,
{
    let body = parse_body(&body?)?;
    let updated = state.record_service.update_record(body).await?;
    Ok(UpdateResponse::Ok(Json(updated)))
}

/// `DELETE /api/{model}?id=<id>`
pub async fn delete<S>(
    State(state): State<AppState<S>>,
    query: Result<Query<DeleteQuery>, QueryRejection>,
) -> Result<DeleteResponse, ApiError>
where
    S: RecordStore + Send + Sync + 'static,
{
    let Query(query) = query?;
    let id: RecordId = query
        .id
        .filter(|raw| !raw.is_empty())
        .ok_or(ValidationError::MissingIdentifier)?
        .parse()?;
    state.record_service.delete_record(id).await?;
    Ok(DeleteResponse::Ok(Json(DeletedBody {
        message: "Record deleted successfully",
    })))
}

/// Bodies are parsed as JSON whatever `Content-Type` says.
fn parse_body(bytes: &Bytes) -> Result<Value, ApiError> {
    Ok(serde_json::from_slice(bytes)?)
}
