mod auth_support;

use pretty_assertions::assert_eq;
use serde_json::json;
use stowage::auth::{AuthError, AuthState, StateStore};
use wiremock::matchers::{any, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_support::*;

#[tokio::test]
async fn cached_valid_access_returns_without_network() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let store = RecordingStateStore::seeded(AuthState {
        access: Some(valid_access("cached-tok")),
        refresh: Some(refresh("r1")),
        credential: Some(credential("alice", "hunter2")),
        ..AuthState::default()
    });
    let auth = auth_against(&server, store);

    let token = auth.get_access_token().await.expect("cache hit");
    assert_eq!(token, "cached-tok");
    server.verify().await;
}

#[tokio::test]
async fn refresh_only_state_renews_and_caches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-tok",
            "expires_in": 3600,
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = RecordingStateStore::seeded(AuthState {
        refresh: Some(refresh("r1")),
        ..AuthState::default()
    });
    let auth = auth_against(&server, store.clone());

    let first = auth.get_access_token().await.expect("renewed");
    assert_eq!(first, "fresh-tok");
    assert_eq!(store.save_count(), 1);

    let snapshot = store.snapshot();
    assert_eq!(snapshot.access.expect("cached access").token, "fresh-tok");
    assert_eq!(snapshot.refresh.expect("refresh kept").token, "r1");

    // Second call is served from the in-memory cache.
    let second = auth.get_access_token().await.expect("cache hit");
    assert_eq!(second, "fresh-tok");
    assert_eq!(store.save_count(), 1);
    server.verify().await;
}

#[tokio::test]
async fn credential_only_state_logs_in_exactly_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "login-tok",
            "expires_in": 3600,
            "refresh_token": "new-refresh",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = RecordingStateStore::seeded(AuthState {
        credential: Some(credential("alice", "hunter2")),
        ..AuthState::default()
    });
    let auth = auth_against(&server, store.clone());

    let token = auth.get_access_token().await.expect("login fallback");
    assert_eq!(token, "login-tok");

    let snapshot = store.snapshot();
    assert_eq!(snapshot.refresh.expect("refresh populated").token, "new-refresh");
    assert!(snapshot.credential.is_some());
    server.verify().await;
}

#[tokio::test]
async fn pending_pairing_falls_through_to_unauthenticated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth/device/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "authorization_pending"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pairing = pending_pairing("dev-1");
    let store = RecordingStateStore::seeded(AuthState {
        xbmc: Some(pairing.clone()),
        ..AuthState::default()
    });
    let auth = auth_against(&server, store.clone());

    let result = auth.get_access_token().await;
    assert!(matches!(result, Err(AuthError::Unauthenticated)));

    // The swallowed failure must not touch the pairing.
    assert_eq!(store.snapshot().xbmc, Some(pairing));
    assert_eq!(store.save_count(), 0);
    server.verify().await;
}

#[tokio::test]
async fn failing_device_exchange_falls_through_to_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth/device/token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fallback-tok",
            "expires_in": 3600,
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = RecordingStateStore::seeded(AuthState {
        xbmc: Some(pending_pairing("dev-1")),
        refresh: Some(refresh("r1")),
        ..AuthState::default()
    });
    let auth = auth_against(&server, store.clone());

    let token = auth.get_access_token().await.expect("fallback");
    assert_eq!(token, "fallback-tok");
    server.verify().await;
}

#[tokio::test]
async fn approved_pairing_renews_via_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth/device/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "device-tok",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = RecordingStateStore::seeded(AuthState {
        xbmc: Some(approved_pairing("dev-1")),
        ..AuthState::default()
    });
    let auth = auth_against(&server, store.clone());

    let token = auth.get_access_token().await.expect("device renewal");
    assert_eq!(token, "device-tok");

    let snapshot = store.snapshot();
    assert!(snapshot.xbmc.expect("pairing kept").is_approved());
    assert_eq!(snapshot.access.expect("access cached").token, "device-tok");
    server.verify().await;
}

#[tokio::test]
async fn empty_state_is_unauthenticated() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let auth = auth_against(&server, RecordingStateStore::empty());
    let result = auth.get_access_token().await;
    assert!(matches!(result, Err(AuthError::Unauthenticated)));
    server.verify().await;
}

#[tokio::test]
async fn expired_access_alone_is_unauthenticated() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let store = RecordingStateStore::seeded(AuthState {
        access: Some(expired_access("stale-tok")),
        ..AuthState::default()
    });
    let auth = auth_against(&server, store.clone());

    let result = auth.get_access_token().await;
    assert!(matches!(result, Err(AuthError::Unauthenticated)));

    // The expired token is left in place; failure costs nothing stored.
    assert_eq!(store.snapshot().access.expect("kept").token, "stale-tok");
    server.verify().await;
}

#[tokio::test]
async fn store_is_read_once_per_manager() {
    let server = MockServer::start().await;
    let store = RecordingStateStore::seeded(AuthState {
        access: Some(valid_access("first-load")),
        ..AuthState::default()
    });
    let auth = auth_against(&server, store.clone());

    assert_eq!(auth.get_access_token().await.expect("cache"), "first-load");

    // External mutation of the backing store is not observed once loaded.
    store
        .save(&AuthState {
            access: Some(valid_access("changed-behind-back")),
            ..AuthState::default()
        })
        .expect("direct save");
    assert_eq!(auth.get_access_token().await.expect("cache"), "first-load");
}
