//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `crudkit.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::str::FromStr;

use serde::Deserialize;

use crudkit_adapter_http_axum::gate::{
    BasicAuthGate, DEFAULT_EXCLUDED_PATHS, DEFAULT_FALLBACK_PATH, DEFAULT_REALM, GateError,
};
use crudkit_domain::error::ValidationError;
use crudkit_domain::model::ModelSchema;

/// Runtime mode. Only [`Environment::Production`] turns the auth gate on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::Validation(format!(
                "unknown environment {other:?}"
            ))),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Runtime mode.
    pub environment: Environment,
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// The model served by the CRUD routes.
    pub model: ModelConfig,
    /// Basic-auth gate settings.
    pub auth: AuthConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
    /// Pool size.
    pub max_connections: u32,
}

/// Model configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Collection name, mounted at `/api/{name}`.
    pub name: String,
    /// Field every record must carry.
    pub required_field: String,
}

/// Basic-auth gate configuration.
#[derive(Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    /// Realm advertised in the `WWW-Authenticate` challenge.
    pub realm: String,
    /// Where unauthenticated requests are rewritten to.
    pub fallback_path: String,
    /// Path prefixes that are never gated.
    pub excluded_paths: Vec<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("realm", &self.realm)
            .field("fallback_path", &self.fallback_path)
            .field("excluded_paths", &self.excluded_paths)
            .finish()
    }
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `crudkit.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("crudkit.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("CRUDKIT_ENV") {
            self.environment = val.parse()?;
        }
        if let Some(val) = lookup("CRUDKIT_HOST") {
            self.server.host = val;
        }
        if let Some(port) = lookup("CRUDKIT_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = lookup("CRUDKIT_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = lookup("CRUDKIT_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = lookup("CRUDKIT_MODEL") {
            self.model.name = val;
        }
        if let Some(val) = lookup("CRUDKIT_REQUIRED_FIELD") {
            self.model.required_field = val;
        }
        if let Some(val) = lookup("BASIC_AUTH_USERNAME") {
            self.auth.username = Some(val);
        }
        if let Some(val) = lookup("BASIC_AUTH_PASSWORD") {
            self.auth.password = Some(val);
        }
        if let Some(val) = lookup("CRUDKIT_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        let schema = self.schema()?;
        let gate = self.gate()?;
        let model_route = format!("/api/{}", schema.name());
        if gate.is_open(&model_route) {
            return Err(ConfigError::Validation(format!(
                "auth fallback or excluded paths cover the model route {model_route}"
            )));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Storage adapter configuration.
    #[must_use]
    pub fn storage(&self) -> crudkit_adapter_storage_sqlite_sqlx::Config {
        crudkit_adapter_storage_sqlite_sqlx::Config {
            database_url: self.database.url.clone(),
            max_connections: self.database.max_connections,
        }
    }

    /// The model schema described by `[model]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Model`] if the name or required field is invalid.
    pub fn schema(&self) -> Result<ModelSchema, ConfigError> {
        Ok(ModelSchema::builder()
            .name(self.model.name.as_str())
            .required_field(self.model.required_field.as_str())
            .build()?)
    }

    /// The auth gate described by `[auth]`, enforcing only in production.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Gate`] if production lacks credentials or the
    /// fallback path is invalid.
    pub fn gate(&self) -> Result<BasicAuthGate, ConfigError> {
        let mut builder = BasicAuthGate::builder()
            .enforce(self.environment == Environment::Production)
            .fallback_path(self.auth.fallback_path.as_str())
            .excluded_paths(self.auth.excluded_paths.clone())
            .realm(self.auth.realm.as_str());
        if let (Some(username), Some(password)) = (&self.auth.username, &self.auth.password) {
            builder = builder.credentials(username.as_str(), password.as_str());
        }
        Ok(builder.build()?)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:crudkit.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        let schema = ModelSchema::default();
        Self {
            name: schema.name().to_string(),
            required_field: schema.required_field().to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            realm: DEFAULT_REALM.to_string(),
            fallback_path: DEFAULT_FALLBACK_PATH.to_string(),
            excluded_paths: DEFAULT_EXCLUDED_PATHS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "crudkitd=info,crudkit=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Invalid `[model]` section.
    #[error("invalid model configuration")]
    Model(#[from] ValidationError),
    /// Invalid `[auth]` section.
    #[error("invalid auth configuration")]
    Gate(#[from] GateError),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.url, "sqlite:crudkit.db?mode=rwc");
        assert_eq!(config.model.name, "records");
        assert_eq!(config.model.required_field, "requiredField");
        assert_eq!(config.auth.fallback_path, "/api/auth");
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            environment = 'production'

            [server]
            host = '127.0.0.1'
            port = 9090

            [database]
            url = 'sqlite:test.db'
            max_connections = 2

            [model]
            name = 'notes'
            required_field = 'title'

            [auth]
            username = 'admin'
            password = 'pw'
            realm = 'Staging'

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.url, "sqlite:test.db");
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.model.name, "notes");
        assert_eq!(config.model.required_field, "title");
        assert_eq!(config.auth.username.as_deref(), Some("admin"));
        assert_eq!(config.auth.realm, "Staging");
        assert_eq!(config.auth.fallback_path, "/api/auth");
        assert_eq!(config.logging.filter, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_apply_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[
                ("CRUDKIT_ENV", "Production"),
                ("CRUDKIT_BIND", "127.0.0.1:8080"),
                ("CRUDKIT_MODEL", "posts"),
                ("BASIC_AUTH_USERNAME", "u"),
                ("BASIC_AUTH_PASSWORD", "p"),
            ]))
            .unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.model.name, "posts");
        assert!(config.gate().unwrap().is_enforcing());
    }

    #[test]
    fn should_reject_unknown_environment() {
        let mut config = Config::default();
        let result = config.apply_overrides(env(&[("CRUDKIT_ENV", "staging")]));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_not_enforce_gate_outside_production() {
        let mut config = Config::default();
        config.auth.username = Some("u".to_string());
        config.auth.password = Some("p".to_string());
        assert!(!config.gate().unwrap().is_enforcing());
    }

    #[test]
    fn should_reject_production_without_credentials() {
        let config = Config {
            environment: Environment::Production,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Gate(GateError::MissingCredentials))
        ));
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_invalid_model_name() {
        let mut config = Config::default();
        config.model.name = "a/b".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Model(ValidationError::InvalidModelName))
        ));
    }

    #[test]
    fn should_reject_model_route_colliding_with_fallback() {
        let mut config = Config::default();
        config.model.name = "auth".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    fn production() -> Config {
        let mut config = Config {
            environment: Environment::Production,
            ..Config::default()
        };
        config.auth.username = Some("admin".to_string());
        config.auth.password = Some("s3cret".to_string());
        config
    }

    #[test]
    fn should_reject_fallback_path_when_prefix_covers_model_route() {
        let mut config = production();
        config.auth.fallback_path = "/api".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn should_reject_excluded_path_when_prefix_covers_model_route() {
        let mut config = production();
        config.auth.excluded_paths = vec!["/api/".to_string()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn should_reject_root_excluded_path() {
        let mut config = production();
        config.auth.excluded_paths = vec!["/".to_string()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Gate(GateError::InvalidExcludedPath(_)))
        ));
    }

    #[test]
    fn should_accept_sibling_prefix_of_model_route() {
        let mut config = production();
        config.auth.excluded_paths = vec!["/api/rec".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_redact_password_in_debug_output() {
        let mut config = Config::default();
        config.auth.password = Some("hunter2".to_string());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn should_map_database_section_to_storage_config() {
        let config = Config::default();
        let storage = config.storage();
        assert_eq!(storage.database_url, "sqlite:crudkit.db?mode=rwc");
        assert_eq!(storage.max_connections, 5);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
