//! Axum router assembly.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{any, get};
use tower::Layer;
use tower_http::trace::TraceLayer;

use crudkit_app::ports::RecordStore;

use crate::gate::{self, BasicAuthGate};
use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Mounts the record routes under `/api/{model}` and the auth fallback
/// endpoint at the gate's fallback path. The gate wraps the routed app from
/// the outside, so a rewritten path is what gets routed. A [`TraceLayer`]
/// logs each HTTP request/response at the `DEBUG` level using the `tracing`
/// ecosystem.
pub fn build<S>(state: AppState<S>, gate: BasicAuthGate) -> Router
where
    S: RecordStore + Send + Sync + 'static,
{
    let auth_gate = Arc::new(gate);
    let records_path = format!("/api/{}", state.model_name());

    let routed = Router::new()
        .route("/health", get(health_check))
        .route(
            auth_gate.fallback_path(),
            any(crate::api::auth::challenge).with_state(Arc::clone(&auth_gate)),
        )
        .nest(&records_path, crate::api::routes())
        .with_state(state);

    let gated = middleware::from_fn_with_state(auth_gate, gate::enforce).layer(routed);

    Router::new()
        .fallback_service(gated)
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> &'static str {
    "OK"
}
