//! Refresh state machine scenarios.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use common::*;
use pretty_assertions::assert_eq;
use tokenwarden_application::{AuthenticateError, Authenticator};
use tokenwarden_domain::{
    RefreshOutcome, Session, TokenExpiration, is_caused_by_auth_invalidation,
    mark_for_invalidation,
};

#[tokio::test]
async fn test_outdated_header_is_replaced_without_refresh() {
    let harness = Harness::new(ScriptedRefreshTransport::always(Step::Timeout), T - 1);
    let stale = request("/me").with_header("Authorization", "Bearer previous");

    let outcome = harness.authenticator.authenticate(&stale).await.unwrap();

    let updated = outcome.into_request().unwrap();
    assert_eq!(updated.authorization(), Some(bearer(OLD_ACCESS).as_str()));
    assert_eq!(harness.transport.call_count(), 0);
}

#[tokio::test]
async fn test_empty_refresh_token_fails_without_network() {
    let session = Session {
        refresh_token: String::new(),
        ..old_session()
    };
    let harness = Harness::with_session(
        session,
        ScriptedRefreshTransport::always(Step::Success(new_payload(Some(299)))),
        T - 1,
    );

    let outcome = harness
        .authenticator
        .authenticate(&harness.stored_token_request("/me"))
        .await
        .unwrap();

    assert_eq!(outcome, RefreshOutcome::RefreshFailed);
    assert_eq!(harness.transport.call_count(), 0);
}

#[tokio::test]
async fn test_successful_refresh_persists_session_and_expiry() {
    let harness = Harness::new(
        ScriptedRefreshTransport::always(Step::Success(new_payload(Some(299)))),
        T - 1,
    );

    let outcome = harness
        .authenticator
        .authenticate(&harness.stored_token_request("/me"))
        .await
        .unwrap();

    let updated = outcome.into_request().unwrap();
    assert_eq!(updated.authorization(), Some(bearer(NEW_ACCESS).as_str()));
    assert_eq!(harness.transport.refresh_tokens_used(), vec![OLD_REFRESH]);
    assert_eq!(
        harness.sessions.snapshot(),
        Session {
            user_id: "user-1".to_string(),
            access_token: NEW_ACCESS.to_string(),
            token_type: "Bearer".to_string(),
            refresh_token: NEW_REFRESH.to_string(),
        }
    );
    assert_eq!(harness.expirations.value(), TokenExpiration::from_millis(T + 299_000));
    assert_eq!(harness.notifier.count(), 0);
}

#[tokio::test]
async fn test_missing_expires_in_leaves_expiry_untouched() {
    let harness = Harness::new(
        ScriptedRefreshTransport::always(Step::Success(new_payload(None))),
        T - 1,
    );

    harness
        .authenticator
        .authenticate(&harness.stored_token_request("/me"))
        .await
        .unwrap();

    assert_eq!(harness.sessions.access_token_history(), vec![NEW_ACCESS]);
    assert_eq!(harness.expirations.value(), TokenExpiration::from_millis(T - 1));
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let transport = ScriptedRefreshTransport::new(
        vec![Step::Status(500, "oops"), Step::Timeout],
        Step::Success(new_payload(Some(299))),
    );
    let harness = Harness::new(transport, T - 1);

    let outcome = harness
        .authenticator
        .authenticate(&harness.stored_token_request("/me"))
        .await
        .unwrap();

    assert!(matches!(outcome, RefreshOutcome::Refreshed(_)));
    assert_eq!(harness.transport.call_count(), 3);
    assert_eq!(harness.notifier.count(), 0);
}

#[tokio::test]
async fn test_three_transient_failures_give_up_without_clearing() {
    let harness = Harness::new(
        ScriptedRefreshTransport::always(Step::Status(500, "unavailable")),
        T - 1,
    );

    let outcome = harness
        .authenticator
        .authenticate(&harness.stored_token_request("/me"))
        .await
        .unwrap();

    assert_eq!(outcome, RefreshOutcome::RefreshFailed);
    assert_eq!(harness.transport.call_count(), 3);
    assert_eq!(harness.notifier.count(), 0);
    assert_eq!(harness.sessions.clear_count(), 0);
    assert_eq!(harness.expirations.clear_count(), 0);
    assert_eq!(harness.sessions.snapshot(), old_session());
}

#[tokio::test]
async fn test_rejected_refresh_token_expires_session() {
    let harness = Harness::new(
        ScriptedRefreshTransport::always(Step::Status(400, INVALID_REFRESH_BODY)),
        T - 1,
    );

    let outcome = harness
        .authenticator
        .authenticate(&harness.stored_token_request("/me"))
        .await
        .unwrap();

    assert_eq!(outcome, RefreshOutcome::Expired);
    assert_eq!(harness.transport.call_count(), 1);
    assert_eq!(harness.notifier.count(), 1);
    assert_eq!(harness.sessions.clear_count(), 1);
    assert_eq!(harness.expirations.clear_count(), 1);
    assert!(harness.sessions.snapshot().is_empty());
    assert_eq!(harness.expirations.value(), TokenExpiration::UNSET);
}

#[tokio::test]
async fn test_expired_refresh_token_after_transient_failure() {
    let transport = ScriptedRefreshTransport::new(
        vec![Step::Timeout],
        Step::Status(401, EXPIRED_REFRESH_BODY),
    );
    let harness = Harness::new(transport, T - 1);

    let outcome = harness
        .authenticator
        .authenticate(&harness.stored_token_request("/me"))
        .await
        .unwrap();

    assert_eq!(outcome, RefreshOutcome::Expired);
    assert_eq!(harness.transport.call_count(), 2);
    assert_eq!(harness.notifier.count(), 1);
}

#[tokio::test]
async fn test_notifier_sees_cleared_stores() {
    let sessions = FakeSessionStore::with_session(old_session());
    let observed = Arc::new(std::sync::Mutex::new(None));
    let notifier = {
        let sessions = sessions.clone();
        let observed = observed.clone();
        move || {
            *observed.lock().unwrap() = Some(sessions.snapshot());
        }
    };
    let authenticator = Authenticator::builder(
        sessions.clone(),
        ScriptedRefreshTransport::always(Step::Status(400, INVALID_REFRESH_BODY)),
        Arc::new(notifier),
        FixedClock::at(T),
    )
    .build();

    let stale = request("/me").with_header("Authorization", bearer(OLD_ACCESS));
    let outcome = authenticator.authenticate(&stale).await.unwrap();

    assert_eq!(outcome, RefreshOutcome::Expired);
    assert_eq!(*observed.lock().unwrap(), Some(Session::default()));
}

#[tokio::test]
async fn test_custom_classifier_decides_expiry() {
    let harness = Harness::new(
        ScriptedRefreshTransport::always(Step::Status(500, "gone")),
        T - 1,
    );
    let authenticator = Authenticator::builder(
        harness.sessions.clone(),
        harness.transport.clone(),
        harness.notifier.clone(),
        harness.clock.clone(),
    )
    .classifier(Arc::new(|_: &(dyn Error + 'static)| true))
    .build();

    let outcome = authenticator
        .authenticate(&harness.stored_token_request("/me"))
        .await
        .unwrap();

    assert_eq!(outcome, RefreshOutcome::Expired);
    assert_eq!(harness.transport.call_count(), 1);
    assert_eq!(harness.notifier.count(), 1);
}

#[tokio::test]
async fn test_marked_request_is_invalidated_after_refresh() {
    let harness = Harness::new(
        ScriptedRefreshTransport::always(Step::Success(new_payload(Some(299)))),
        T - 1,
    );
    let marked = mark_for_invalidation(harness.stored_token_request("/logout"));

    let error = harness.authenticator.authenticate(&marked).await.unwrap_err();

    assert!(matches!(error, AuthenticateError::InvalidatedAfterRefresh(_)));
    assert!(is_caused_by_auth_invalidation(&error));
    assert_eq!(harness.sessions.snapshot().access_token, NEW_ACCESS);
}

#[tokio::test]
async fn test_marked_request_with_outdated_header_is_not_invalidated() {
    let harness = Harness::new(
        ScriptedRefreshTransport::always(Step::Success(new_payload(Some(299)))),
        T - 1,
    );
    let marked = mark_for_invalidation(request("/logout").with_header("Authorization", "Bearer x"));

    let outcome = harness.authenticator.authenticate(&marked).await.unwrap();

    assert!(matches!(outcome, RefreshOutcome::Refreshed(_)));
    assert_eq!(harness.transport.call_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_one_refresh() {
    let transport = ScriptedRefreshTransport::with_delay(
        Vec::new(),
        Step::Success(new_payload(Some(299))),
        Duration::from_millis(50),
    );
    let harness = Harness::new(transport, T - 1);
    let stale = harness.stored_token_request("/feed");

    let tasks: Vec<_> = (0..10)
        .map(|_| {
            let authenticator = harness.authenticator.clone();
            let stale = stale.clone();
            tokio::spawn(async move { authenticator.authenticate(&stale).await })
        })
        .collect();

    for task in tasks {
        let updated = task.await.unwrap().unwrap().into_request().unwrap();
        assert_eq!(updated.authorization(), Some(bearer(NEW_ACCESS).as_str()));
    }
    assert_eq!(harness.transport.call_count(), 1);
    assert_eq!(harness.sessions.access_token_history(), vec![NEW_ACCESS]);
}
