//! Settings loaded from an optional file and `TOKENWARDEN__*` variables.
//!
//! Environment variables use `__` between nesting levels, e.g.
//! `TOKENWARDEN__REFRESH__PATH=auth/refresh` or
//! `TOKENWARDEN__SESSION__MAX_AUTH_FOLLOW_UPS=1`.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tokenwarden_application::DEFAULT_MAX_AUTH_FOLLOW_UPS;

use crate::adapters::{DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT};
use crate::auth::RefreshEndpoint;

/// Prefix of environment variables read by [`TokenwardenSettings::load`].
pub const ENV_PREFIX: &str = "TOKENWARDEN";

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A source could not be read or the values did not match the schema.
    #[error("failed to load settings: {0}")]
    Config(#[from] config::ConfigError),
}

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TokenwardenSettings {
    /// Base URL the refresh path is resolved against.
    pub base_url: Option<String>,
    /// Client id attached to session-less calls.
    pub client_id: String,
    /// Refresh endpoint shape.
    pub refresh: RefreshEndpoint,
    /// HTTP adapter options.
    pub http: HttpSettings,
    /// Session pipeline options.
    pub session: SessionSettings,
    /// Persistence options.
    pub storage: StorageSettings,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for TokenwardenSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            client_id: String::new(),
            refresh: RefreshEndpoint::default(),
            http: HttpSettings::default(),
            session: SessionSettings::default(),
            storage: StorageSettings::default(),
            log_filter: "info".to_string(),
        }
    }
}

/// HTTP adapter options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Session pipeline options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Track access-token expiry and refresh proactively. Only enable it for
    /// token endpoints that report `expires_in`.
    pub token_expiration: bool,
    /// How many times a 401 may trigger a refresh for one call.
    pub max_auth_follow_ups: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            token_expiration: false,
            max_auth_follow_ups: DEFAULT_MAX_AUTH_FOLLOW_UPS,
        }
    }
}

/// Persistence options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory for the session documents; in-memory stores when unset.
    pub directory: Option<PathBuf>,
}

impl TokenwardenSettings {
    /// Loads settings from `file` (if given and present) overridden by the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is malformed or a value has the wrong type.
    pub fn load(file: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_with_env(file, Environment::with_prefix(ENV_PREFIX))
    }

    /// Like [`TokenwardenSettings::load`] but with a caller-supplied
    /// environment source.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is malformed or a value has the wrong type.
    pub fn load_with_env(
        file: Option<&Path>,
        environment: Environment,
    ) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(false));
        }
        let settings = builder
            .add_source(environment.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Installs the global subscriber with `log_filter` as the fallback
    /// directive. See [`crate::telemetry::init_tracing`].
    pub fn init_tracing(&self) -> bool {
        crate::telemetry::init_tracing(&self.log_filter)
    }
}
