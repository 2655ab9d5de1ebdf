//! Test doubles shared by the application integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokenwarden_application::ports::{
    Clock, HttpClient, HttpClientError, HttpFuture, HttpStatusError, RefreshError,
    RefreshTransport, SessionStore, StoreError, TokenExpirationStore,
};
use tokenwarden_application::{Authenticator, REFRESH_TOKEN_RETRY_COUNT};
use tokenwarden_domain::{
    Headers, HttpMethod, HttpRequest, HttpResponse, Session, SessionPayload, StatusCode,
    TokenExpiration,
};

pub const T: i64 = 1_700_000_000_000;
pub const OLD_ACCESS: &str = "old-access";
pub const OLD_REFRESH: &str = "old-refresh";
pub const NEW_ACCESS: &str = "new-access";
pub const NEW_REFRESH: &str = "new-refresh";

pub const INVALID_REFRESH_BODY: &str = r#"{"message":"Invalid refresh token: old-refresh"}"#;
pub const EXPIRED_REFRESH_BODY: &str = r#"{"message":"Invalid refresh token (expired): old-refresh"}"#;

const _: () = assert!(REFRESH_TOKEN_RETRY_COUNT == 3);

pub fn old_session() -> Session {
    Session {
        user_id: "user-1".to_string(),
        access_token: OLD_ACCESS.to_string(),
        token_type: "Bearer".to_string(),
        refresh_token: OLD_REFRESH.to_string(),
    }
}

pub fn new_payload(expires_in: Option<i64>) -> SessionPayload {
    SessionPayload {
        user_id: "user-1".to_string(),
        token: NEW_ACCESS.to_string(),
        refresh_token: NEW_REFRESH.to_string(),
        token_type: "Bearer".to_string(),
        expires_in,
    }
}

pub fn request(path: &str) -> HttpRequest {
    HttpRequest::parse(HttpMethod::Get, &format!("https://api.example.com{path}")).unwrap()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Clock pinned to a settable instant.
#[derive(Debug)]
pub struct FixedClock(AtomicI64);

impl FixedClock {
    pub fn at(millis: i64) -> Arc<Self> {
        Arc::new(Self(AtomicI64::new(millis)))
    }

    pub fn set(&self, millis: i64) {
        self.0.store(millis, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now_millis()).unwrap_or_default()
    }

    fn now_millis(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Session store recording every access token written and every clear.
#[derive(Debug, Default)]
pub struct FakeSessionStore {
    session: Mutex<Session>,
    access_token_history: Mutex<Vec<String>>,
    clear_count: AtomicUsize,
}

impl FakeSessionStore {
    pub fn with_session(session: Session) -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(session),
            ..Self::default()
        })
    }

    pub fn snapshot(&self) -> Session {
        self.session.lock().unwrap().clone()
    }

    pub fn access_token_history(&self) -> Vec<String> {
        self.access_token_history.lock().unwrap().clone()
    }

    pub fn clear_count(&self) -> usize {
        self.clear_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionStore for FakeSessionStore {
    async fn load(&self) -> Result<Session, StoreError> {
        Ok(self.snapshot())
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        self.access_token_history
            .lock()
            .unwrap()
            .push(session.access_token.clone());
        *self.session.lock().unwrap() = session.clone();
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.clear_count.fetch_add(1, Ordering::SeqCst);
        *self.session.lock().unwrap() = Session::default();
        Ok(())
    }
}

/// Expiration store counting clears.
#[derive(Debug)]
pub struct FakeExpirationStore {
    expires_at: Mutex<TokenExpiration>,
    clear_count: AtomicUsize,
}

impl FakeExpirationStore {
    pub fn at(expires_at: i64) -> Arc<Self> {
        Arc::new(Self {
            expires_at: Mutex::new(TokenExpiration::from_millis(expires_at)),
            clear_count: AtomicUsize::new(0),
        })
    }

    pub fn value(&self) -> TokenExpiration {
        *self.expires_at.lock().unwrap()
    }

    pub fn clear_count(&self) -> usize {
        self.clear_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenExpirationStore for FakeExpirationStore {
    async fn access_token_expires_at(&self) -> Result<TokenExpiration, StoreError> {
        Ok(self.value())
    }

    async fn set_access_token_expires_at(
        &self,
        expires_at: TokenExpiration,
    ) -> Result<(), StoreError> {
        *self.expires_at.lock().unwrap() = expires_at;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.clear_count.fetch_add(1, Ordering::SeqCst);
        *self.expires_at.lock().unwrap() = TokenExpiration::UNSET;
        Ok(())
    }
}

/// One scripted answer of the refresh endpoint.
#[derive(Debug, Clone)]
pub enum Step {
    Success(SessionPayload),
    Status(u16, &'static str),
    Timeout,
}

impl Step {
    fn into_result(self) -> Result<SessionPayload, RefreshError> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::Status(status, body) => Err(HttpStatusError::new(status, body).into()),
            Self::Timeout => Err(HttpClientError::Timeout { timeout_ms: 10 }.into()),
        }
    }
}

/// Refresh transport answering from a script, then repeating a fallback.
#[derive(Debug)]
pub struct ScriptedRefreshTransport {
    steps: Mutex<VecDeque<Step>>,
    fallback: Step,
    delay: Duration,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRefreshTransport {
    pub fn new(steps: Vec<Step>, fallback: Step) -> Arc<Self> {
        Self::with_delay(steps, fallback, Duration::ZERO)
    }

    pub fn always(step: Step) -> Arc<Self> {
        Self::new(Vec::new(), step)
    }

    pub fn with_delay(steps: Vec<Step>, fallback: Step, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            fallback,
            delay,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn refresh_tokens_used(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RefreshTransport for ScriptedRefreshTransport {
    async fn refresh(&self, refresh_token: &str) -> Result<SessionPayload, RefreshError> {
        self.calls.lock().unwrap().push(refresh_token.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        step.into_result()
    }
}

/// Notifier counting calls.
#[derive(Debug, Default)]
pub struct CountingNotifier(AtomicUsize);

impl CountingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl tokenwarden_application::ports::SessionExpiredNotifier for CountingNotifier {
    fn on_session_expired(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

type Responder = dyn Fn(&HttpRequest) -> HttpResponse + Send + Sync;

/// HTTP client recording requests and answering through a closure.
pub struct MockHttpClient {
    responder: Box<Responder>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl MockHttpClient {
    pub fn new(responder: impl Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            sent: Mutex::new(Vec::new()),
        })
    }

    /// Answers 200 to requests carrying `Bearer {token}`, 401 otherwise.
    pub fn accepting(token: &'static str) -> Arc<Self> {
        Self::new(move |request| {
            if request.authorization() == Some(bearer(token).as_str()) {
                response(200)
            } else {
                response(401)
            }
        })
    }

    pub fn sent(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_authorizations(&self) -> Vec<Option<String>> {
        self.sent()
            .iter()
            .map(|r| r.authorization().map(ToString::to_string))
            .collect()
    }
}

impl HttpClient for MockHttpClient {
    fn execute(&self, request: &HttpRequest) -> HttpFuture<'_> {
        self.sent.lock().unwrap().push(request.clone());
        let response = (self.responder)(request);
        Box::pin(async move { Ok(response) })
    }
}

pub fn response(status: u16) -> HttpResponse {
    HttpResponse::new(StatusCode::new(status), Headers::new(), Vec::new())
}

/// Collaborators of one authenticator under test.
pub struct Harness {
    pub sessions: Arc<FakeSessionStore>,
    pub expirations: Arc<FakeExpirationStore>,
    pub transport: Arc<ScriptedRefreshTransport>,
    pub notifier: Arc<CountingNotifier>,
    pub clock: Arc<FixedClock>,
    pub authenticator: Arc<Authenticator>,
}

impl Harness {
    pub fn new(transport: Arc<ScriptedRefreshTransport>, expires_at: i64) -> Self {
        Self::with_session(old_session(), transport, expires_at)
    }

    pub fn with_session(
        session: Session,
        transport: Arc<ScriptedRefreshTransport>,
        expires_at: i64,
    ) -> Self {
        let sessions = FakeSessionStore::with_session(session);
        let expirations = FakeExpirationStore::at(expires_at);
        let notifier = CountingNotifier::new();
        let clock = FixedClock::at(T);
        let authenticator = Arc::new(
            Authenticator::builder(
                sessions.clone(),
                transport.clone(),
                notifier.clone(),
                clock.clone(),
            )
            .expiration_store(expirations.clone())
            .build(),
        );
        Self {
            sessions,
            expirations,
            transport,
            notifier,
            clock,
            authenticator,
        }
    }

    /// A request as sent with the currently stored token.
    pub fn stored_token_request(&self, path: &str) -> HttpRequest {
        request(path).with_header("Authorization", self.sessions.snapshot().authorization_header())
    }
}
