//! Authorization initiation tests

use std::time::Duration;

use pretty_assertions::assert_eq;

use tallysync_broker::BrokerError;
use tallysync_core::{BrokerEvent, NotificationKind, Provider};

use tests::events::{collect_events, notifications};
use tests::harness;

// ====== begin_connection Tests ======

#[tokio::test]
async fn begin_connection_opens_surface_and_tracks_pending() {
    let h = harness();
    let mut rx = h.bus.subscribe();

    h.broker.begin_connection(Provider::Email).await.unwrap();

    assert!(h.broker.is_pending(Provider::Email));
    assert_eq!(
        h.opener.opened_urls(),
        vec!["http://consent.test/authorize".to_string()]
    );

    let events = collect_events(&mut rx, Duration::from_millis(100)).await;
    assert!(events.iter().any(|e| matches!(
        e,
        BrokerEvent::AuthorizationStarted {
            provider: Provider::Email
        }
    )));
}

#[tokio::test]
async fn second_begin_supersedes_not_duplicates() {
    let h = harness();

    h.broker.begin_connection(Provider::Drive).await.unwrap();
    h.broker.begin_connection(Provider::Drive).await.unwrap();

    // two surfaces were opened, but exactly one attempt is pending
    assert_eq!(h.opener.opened_urls().len(), 2);
    assert_eq!(h.broker.pending_count(), 1);
    assert!(h.broker.is_pending(Provider::Drive));
}

#[tokio::test]
async fn concurrent_providers_are_pending_independently() {
    let h = harness();

    h.broker.begin_connection(Provider::Email).await.unwrap();
    h.broker.begin_connection(Provider::Drive).await.unwrap();

    assert_eq!(h.broker.pending_count(), 2);
    assert!(h.broker.is_pending(Provider::Email));
    assert!(h.broker.is_pending(Provider::Drive));
}

#[tokio::test]
async fn auth_url_failure_leaves_nothing_pending() {
    let h = harness();
    let mut rx = h.bus.subscribe();
    h.backend.fail_auth_url("Email integration not configured");

    let err = h.broker.begin_connection(Provider::Email).await.unwrap_err();
    assert!(matches!(err, BrokerError::AuthUrlUnavailable { .. }));

    // no surface was opened and no attempt recorded
    assert!(h.opener.opened_urls().is_empty());
    assert!(!h.broker.is_pending(Provider::Email));

    // the backend's detail is surfaced verbatim
    let events = collect_events(&mut rx, Duration::from_millis(100)).await;
    let notes = notifications(&events);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind, NotificationKind::Error);
    assert_eq!(notes[0].message, "Email integration not configured");
}

#[tokio::test]
async fn surface_open_failure_is_reported() {
    let h = harness();
    h.opener.fail_next();

    let err = h.broker.begin_connection(Provider::Drive).await.unwrap_err();
    assert!(matches!(err, BrokerError::SurfaceUnavailable { .. }));
    assert!(!h.broker.is_pending(Provider::Drive));
}

#[tokio::test]
async fn begin_connection_never_touches_status_cache() {
    let h = harness();

    h.broker.begin_connection(Provider::Email).await.unwrap();

    assert_eq!(h.backend.status_call_count(), 0);
    let snapshot = h.broker.snapshot().await;
    assert!(snapshot.last_refreshed_at.is_none());
}
