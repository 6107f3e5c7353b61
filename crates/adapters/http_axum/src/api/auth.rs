//! Auth fallback endpoint — where the gate sends unauthenticated requests.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::gate::BasicAuthGate;

#[derive(Serialize)]
struct ChallengeBody {
    error: &'static str,
}

/// `401` with a `WWW-Authenticate: Basic` challenge for `realm`.
pub fn challenge_response(realm: &str) -> Response {
    let header = HeaderValue::from_str(&format!("Basic realm=\"{realm}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("Basic"));
    (
        StatusCode::UNAUTHORIZED,
        [(WWW_AUTHENTICATE, header)],
        Json(ChallengeBody {
            error: "Authentication required",
        }),
    )
        .into_response()
}

/// `ANY /api/auth`
pub async fn challenge(State(gate): State<Arc<BasicAuthGate>>) -> Response {
    challenge_response(gate.realm())
}
