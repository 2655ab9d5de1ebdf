//! Refresh transports

mod form_refresh_transport;

pub use form_refresh_transport::{
    DEFAULT_GRANT_TYPE, DEFAULT_REFRESH_PATH, DEFAULT_REFRESH_TOKEN_FIELD, FormRefreshTransport,
    RefreshEndpoint, RefreshFieldProvider,
};
