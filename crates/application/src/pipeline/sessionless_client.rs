//! Pipeline for endpoints that need no session.

use std::sync::Arc;

use tokenwarden_domain::HttpRequest;
use tracing::debug;

use super::ClientIdParameter;
use crate::ports::{HttpClient, HttpFuture};

/// Sends requests with the client id attached and nothing else.
///
/// It implements [`HttpClient`] itself, so anything that takes a client port
/// (the refresh transport, for example) can be pointed at it.
#[derive(Clone)]
pub struct SessionlessClient {
    http: Arc<dyn HttpClient>,
    client_id: ClientIdParameter,
}

impl SessionlessClient {
    /// Creates the pipeline on top of `http`.
    #[must_use]
    pub fn new(http: Arc<dyn HttpClient>, client_id: ClientIdParameter) -> Self {
        Self { http, client_id }
    }
}

impl HttpClient for SessionlessClient {
    fn execute(&self, request: &HttpRequest) -> HttpFuture<'_> {
        let request = self.client_id.apply(request.clone());
        Box::pin(async move {
            debug!(method = %request.method, url = %request.url, "sending sessionless request");
            self.http.execute(&request).await
        })
    }
}

impl std::fmt::Debug for SessionlessClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionlessClient")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}
