//! Basic-auth gate that runs in front of routing.
//!
//! Each request ends in one of two states. [`Decision::Pass`] leaves it
//! untouched. [`Decision::Rewrite`] points its path at the auth fallback
//! endpoint before the router sees it, so whatever was asked for is never
//! served. The check is stateless: no sessions, no expiry, no rate limiting.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::uri::PathAndQuery;
use axum::http::{HeaderValue, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use subtle::ConstantTimeEq;

/// Default endpoint unauthenticated requests are rewritten to.
pub const DEFAULT_FALLBACK_PATH: &str = "/api/auth";

/// Default realm advertised in the `WWW-Authenticate` challenge.
pub const DEFAULT_REALM: &str = "Secure Area";

/// Paths that are never gated, besides the fallback endpoint itself.
pub const DEFAULT_EXCLUDED_PATHS: [&str; 4] = ["/static", "/_image", "/favicon.ico", "/health"];

/// Outcome of checking one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Pass,
    Rewrite,
}

/// Gate construction failures.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("basic-auth username and password are required when enforcement is on")]
    MissingCredentials,
    #[error("fallback path must be an absolute path without a query: {0:?}")]
    InvalidFallbackPath(String),
    #[error("excluded path must be an absolute path below the root: {0:?}")]
    InvalidExcludedPath(String),
}

struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    fn matches(&self, username: &str, password: &str) -> bool {
        let user_ok = username.as_bytes().ct_eq(self.username.as_bytes());
        let pass_ok = password.as_bytes().ct_eq(self.password.as_bytes());
        (user_ok & pass_ok).into()
    }
}

/// Stateless basic-auth check. `credentials` is `None` when not enforcing.
pub struct BasicAuthGate {
    credentials: Option<Credentials>,
    fallback_path: String,
    excluded_paths: Vec<String>,
    realm: String,
}

impl std::fmt::Debug for BasicAuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuthGate")
            .field("enforcing", &self.is_enforcing())
            .field("fallback_path", &self.fallback_path)
            .field("excluded_paths", &self.excluded_paths)
            .field("realm", &self.realm)
            .finish_non_exhaustive()
    }
}

impl BasicAuthGate {
    /// Create a builder for constructing a [`BasicAuthGate`].
    #[must_use]
    pub fn builder() -> BasicAuthGateBuilder {
        BasicAuthGateBuilder::default()
    }

    /// A gate that lets everything through.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            credentials: None,
            fallback_path: DEFAULT_FALLBACK_PATH.to_string(),
            excluded_paths: Vec::new(),
            realm: DEFAULT_REALM.to_string(),
        }
    }

    #[must_use]
    pub fn is_enforcing(&self) -> bool {
        self.credentials.is_some()
    }

    #[must_use]
    pub fn fallback_path(&self) -> &str {
        &self.fallback_path
    }

    #[must_use]
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Decide what to do with a request to `path` carrying `authorization`.
    #[must_use]
    pub fn decide(&self, path: &str, authorization: Option<&HeaderValue>) -> Decision {
        let Some(expected) = &self.credentials else {
            return Decision::Pass;
        };
        if self.is_open(path) {
            return Decision::Pass;
        }
        match authorization.and_then(parse_basic) {
            Some((username, password)) if expected.matches(&username, &password) => Decision::Pass,
            _ => Decision::Rewrite,
        }
    }

    /// Whether `path` bypasses the credential check, either as the fallback
    /// endpoint or below an excluded prefix.
    #[must_use]
    pub fn is_open(&self, path: &str) -> bool {
        std::iter::once(self.fallback_path.as_str())
            .chain(self.excluded_paths.iter().map(String::as_str))
            .any(|prefix| matches_prefix(path, prefix))
    }

    /// Same URI with the path replaced by the fallback endpoint.
    fn rewrite(&self, uri: &Uri) -> Option<Uri> {
        let target = match uri.query() {
            Some(query) => format!("{}?{query}", self.fallback_path),
            None => self.fallback_path.clone(),
        };
        let mut parts = uri.clone().into_parts();
        parts.path_and_query = Some(PathAndQuery::try_from(target).ok()?);
        Uri::from_parts(parts).ok()
    }
}

/// Step-by-step builder for [`BasicAuthGate`].
#[derive(Debug, Default)]
pub struct BasicAuthGateBuilder {
    enforce: bool,
    username: Option<String>,
    password: Option<String>,
    fallback_path: Option<String>,
    excluded_paths: Option<Vec<String>>,
    realm: Option<String>,
}

impl BasicAuthGateBuilder {
    #[must_use]
    pub fn enforce(mut self, enforce: bool) -> Self {
        self.enforce = enforce;
        self
    }

    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn fallback_path(mut self, path: impl Into<String>) -> Self {
        self.fallback_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn excluded_paths(mut self, paths: Vec<String>) -> Self {
        self.excluded_paths = Some(paths);
        self
    }

    #[must_use]
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    /// Consume the builder and return a [`BasicAuthGate`].
    ///
    /// # Errors
    ///
    /// Returns [`GateError::MissingCredentials`] when enforcing without a
    /// non-empty username and password, [`GateError::InvalidFallbackPath`],
    /// or [`GateError::InvalidExcludedPath`]. A prefix that trims down to the
    /// root is rejected since it would open every path.
    pub fn build(self) -> Result<BasicAuthGate, GateError> {
        let fallback_path = self
            .fallback_path
            .unwrap_or_else(|| DEFAULT_FALLBACK_PATH.to_string());
        if !is_valid_prefix(&fallback_path)
            || fallback_path.contains('?')
            || PathAndQuery::try_from(fallback_path.as_str()).is_err()
        {
            return Err(GateError::InvalidFallbackPath(fallback_path));
        }

        let excluded_paths = self.excluded_paths.unwrap_or_else(|| {
            DEFAULT_EXCLUDED_PATHS
                .iter()
                .map(ToString::to_string)
                .collect()
        });
        if let Some(path) = excluded_paths.iter().find(|path| !is_valid_prefix(path)) {
            return Err(GateError::InvalidExcludedPath(path.clone()));
        }

        let credentials = if self.enforce {
            match (self.username, self.password) {
                (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                    Some(Credentials { username, password })
                }
                _ => return Err(GateError::MissingCredentials),
            }
        } else {
            None
        };

        Ok(BasicAuthGate {
            credentials,
            fallback_path,
            excluded_paths,
            realm: self.realm.unwrap_or_else(|| DEFAULT_REALM.to_string()),
        })
    }
}

/// Middleware entry point, installed with `axum::middleware::from_fn_with_state`
/// around the whole router.
pub async fn enforce(
    State(gate): State<Arc<BasicAuthGate>>,
    mut request: Request,
    next: Next,
) -> Response {
    let decision = gate.decide(request.uri().path(), request.headers().get(AUTHORIZATION));
    if decision == Decision::Rewrite {
        tracing::debug!(
            path = request.uri().path(),
            fallback = gate.fallback_path(),
            "rewriting unauthenticated request"
        );
        match gate.rewrite(request.uri()) {
            Some(uri) => *request.uri_mut() = uri,
            None => return crate::api::auth::challenge_response(gate.realm()).into_response(),
        }
    }
    next.run(request).await
}

/// `Basic base64(user:password)` → `(user, password)`.
fn parse_basic(value: &HeaderValue) -> Option<(String, String)> {
    let (scheme, token) = value.to_str().ok()?.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(token.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

fn is_valid_prefix(prefix: &str) -> bool {
    prefix.starts_with('/') && !prefix.trim_end_matches('/').is_empty()
}

/// `prefix` matches itself and anything below it, segment-wise.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
