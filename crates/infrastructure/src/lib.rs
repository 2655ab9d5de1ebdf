//! Tokenwarden Infrastructure - Adapters and wiring
//!
//! This crate provides the reqwest HTTP adapter, the form-encoded refresh
//! transport, file-backed stores, settings loading and the builder that
//! assembles the session and session-less pipelines.

pub mod adapters;
pub mod auth;
pub mod client_builder;
pub mod persistence;
pub mod serialization;
pub mod settings;
pub mod telemetry;

pub use adapters::{ManualClock, ReqwestHttpClient, SystemClock};
pub use auth::{FormRefreshTransport, RefreshEndpoint, RefreshFieldProvider};
pub use client_builder::{ClientBuildError, OAuthClientBuilder, OAuthClients};
pub use persistence::{FileSessionStore, FileTokenExpirationStore, TokioFileSystem};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};
pub use settings::{
    ENV_PREFIX, HttpSettings, SessionSettings, SettingsError, StorageSettings, TokenwardenSettings,
};
pub use telemetry::init_tracing;
