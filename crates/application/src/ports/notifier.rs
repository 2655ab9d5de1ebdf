//! Session-expired notification port

/// Receives the event fired once the session could not be recovered.
///
/// Called after the stores were cleared, at most once per expiry event.
pub trait SessionExpiredNotifier: Send + Sync {
    /// Handles the expiry, typically by routing the user to sign in again.
    fn on_session_expired(&self);
}

impl<F> SessionExpiredNotifier for F
where
    F: Fn() + Send + Sync,
{
    fn on_session_expired(&self) {
        self();
    }
}
