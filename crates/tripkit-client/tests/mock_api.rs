//! Mock API tests for the session client.
//!
//! These tests use wiremock to simulate the marketplace backend and
//! exercise the token-refresh cycle without network access: bearer
//! injection, single-flight refresh, queue draining, retry-once
//! semantics, and the session-expired hook.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tripkit_client::SessionClient;
use tripkit_core::error::{AuthError, Error, RefreshError};
use tripkit_core::{
    AccessToken, ApiUrl, Credentials, Marketplace, MemoryTokenStore, RefreshToken, TokenStore,
};

/// Helper to create an API URL from a mock server.
fn mock_api_url(server: &MockServer) -> ApiUrl {
    // For tests, we need to allow HTTP localhost
    ApiUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap()
}

/// Store seeded with a credential pair.
fn seeded_store(access: &str, refresh: Option<&str>) -> Arc<MemoryTokenStore> {
    Arc::new(MemoryTokenStore::with_tokens(
        AccessToken::new(access),
        refresh.map(RefreshToken::new),
    ))
}

/// Hook that counts invocations.
fn counting_hook(counter: Arc<AtomicUsize>) -> Arc<impl Fn() + Send + Sync> {
    Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

fn profile_body() -> serde_json::Value {
    json!({
        "data": {
            "id": 1,
            "email": "alice@example.com",
            "nickname": "alice",
            "role": "user"
        }
    })
}

// ============================================================================
// Authentication Tests
// ============================================================================

#[tokio::test]
async fn test_login_stores_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({
            "email": "alice@example.com",
            "password": "secret123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "access_token": "access-1",
                "refresh_token": "refresh-1",
                "user": {
                    "id": 1,
                    "email": "alice@example.com",
                    "nickname": "alice",
                    "role": "user"
                }
            }
        })))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let client = SessionClient::new(mock_api_url(&server), store.clone());

    let profile = client
        .login(Credentials::new("alice@example.com", "secret123"))
        .await
        .unwrap();

    assert_eq!(profile.nickname, "alice");
    assert_eq!(store.access_token().unwrap().as_str(), "access-1");
    assert_eq!(store.refresh_token().unwrap().as_str(), "refresh-1");
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_login_invalid_credentials_does_not_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "InvalidCredentials",
            "message": "wrong email or password"
        })))
        .mount(&server)
        .await;

    // A 401 from login is bad credentials, never a refresh trigger
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let client = SessionClient::new(mock_api_url(&server), Arc::new(MemoryTokenStore::new()));
    let result = client
        .login(Credentials::new("bad@example.com", "wrongpass"))
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, Error::Api(ref e) if e.status == 401));
}

#[tokio::test]
async fn test_request_attaches_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .mount(&server)
        .await;

    let client = SessionClient::new(mock_api_url(&server), seeded_store("access-1", None));
    let profile = client.profile().await.unwrap();

    assert_eq!(profile.email, "alice@example.com");
}

// ============================================================================
// Refresh Cycle Tests
// ============================================================================

#[tokio::test]
async fn test_401_refreshes_and_retries_with_new_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "TokenExpired",
            "message": "access token expired"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({ "refresh_token": "refresh-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "access_token": "fresh",
                "refresh_token": "refresh-2"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .expect(1)
        .mount(&server)
        .await;

    let store = seeded_store("stale", Some("refresh-1"));
    let client = SessionClient::new(mock_api_url(&server), store.clone());

    let profile = client.profile().await.unwrap();

    assert_eq!(profile.id, 1);
    // Rotated pair is stored
    assert_eq!(store.access_token().unwrap().as_str(), "fresh");
    assert_eq!(store.refresh_token().unwrap().as_str(), "refresh-2");
}

#[tokio::test]
async fn test_refresh_keeps_old_refresh_token_when_not_rotated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "access_token": "fresh" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .mount(&server)
        .await;

    let store = seeded_store("stale", Some("refresh-1"));
    let client = SessionClient::new(mock_api_url(&server), store.clone());

    client.profile().await.unwrap();

    assert_eq!(store.refresh_token().unwrap().as_str(), "refresh-1");
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(3)
        .mount(&server)
        .await;

    // Delay keeps the refresh in flight while the other 401s arrive,
    // forcing them onto the waiter queue.
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({ "refresh_token": "refresh-1" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(200))
                .set_body_json(json!({
                    "data": { "access_token": "fresh", "refresh_token": "refresh-2" }
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .expect(3)
        .mount(&server)
        .await;

    let store = seeded_store("stale", Some("refresh-1"));
    let client = SessionClient::new(mock_api_url(&server), store);

    let (a, b, c) = tokio::join!(client.profile(), client.profile(), client.profile());

    assert!(a.is_ok());
    assert!(b.is_ok());
    assert!(c.is_ok());
    // Mock expectations verify exactly one refresh call on server drop
}

#[tokio::test]
async fn test_refresh_failure_fails_all_waiters_and_fires_hook_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_delay(Duration::from_millis(200))
                .set_body_json(json!({
                    "error": "InvalidToken",
                    "message": "refresh token revoked"
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let expired = Arc::new(AtomicUsize::new(0));
    let store = seeded_store("stale", Some("revoked"));
    let client = SessionClient::with_expiry_hook(
        mock_api_url(&server),
        store.clone(),
        counting_hook(expired.clone()),
    );

    let (a, b, c) = tokio::join!(client.profile(), client.profile(), client.profile());

    for result in [a, b, c] {
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            Error::Auth(AuthError::RefreshFailed(RefreshError::Rejected {
                status: 401
            }))
        ));
    }

    // Terminal failure: tokens cleared, hook fired exactly once
    assert!(store.access_token().is_none());
    assert!(store.refresh_token().is_none());
    assert_eq!(expired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_refresh_token_skips_network_call() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let expired = Arc::new(AtomicUsize::new(0));
    let store = seeded_store("stale", None);
    let client = SessionClient::with_expiry_hook(
        mock_api_url(&server),
        store.clone(),
        counting_hook(expired.clone()),
    );

    let err = client.profile().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Auth(AuthError::RefreshFailed(RefreshError::MissingToken))
    ));

    assert!(store.access_token().is_none());
    assert_eq!(expired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_second_401_after_refresh_is_terminal() {
    let server = MockServer::start().await;

    // The endpoint rejects both the stale and the fresh token
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "access_token": "fresh" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SessionClient::new(mock_api_url(&server), seeded_store("stale", Some("refresh-1")));

    let err = client.profile().await.unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::Expired)));
    // expect(1) on the refresh mock verifies no second refresh was attempted
}

#[tokio::test]
async fn test_failed_cycle_does_not_block_the_next_one() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = seeded_store("stale", Some("revoked"));
    let client = SessionClient::new(mock_api_url(&server), store.clone());

    let err = client.profile().await.unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::RefreshFailed(_))));

    // Re-authenticate and swap the backend to a healthy state
    server.reset().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer stale-2"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({ "refresh_token": "refresh-2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "access_token": "fresh-2" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer fresh-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .mount(&server)
        .await;

    store.set_tokens(
        AccessToken::new("stale-2"),
        Some(RefreshToken::new("refresh-2")),
    );

    // The in-flight flag was reset by the failed cycle, so a new refresh
    // can start
    let profile = client.profile().await.unwrap();
    assert_eq!(profile.id, 1);
}

// ============================================================================
// Passthrough and Operation Tests
// ============================================================================

#[tokio::test]
async fn test_non_401_errors_pass_through_unchanged() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/courses"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "Internal",
            "message": "database unavailable"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = seeded_store("access-1", Some("refresh-1"));
    let client = SessionClient::new(mock_api_url(&server), store.clone());

    let err = client.list_courses(None, None).await.unwrap_err();
    match err {
        Error::Api(e) => {
            assert_eq!(e.status, 500);
            assert_eq!(e.code.as_deref(), Some("Internal"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }

    // A non-401 error must not touch the stored tokens
    assert!(store.access_token().is_some());
}

#[tokio::test]
async fn test_list_courses_with_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/courses"))
        .and(wiremock::matchers::query_param("region", "jeju"))
        .and(wiremock::matchers::query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "courses": [
                    {
                        "id": 10,
                        "title": "Jeju hiking week",
                        "region": "jeju",
                        "price": 450000,
                        "start_date": "2026-04-06",
                        "end_date": "2026-04-12"
                    }
                ],
                "next_page": 3
            }
        })))
        .mount(&server)
        .await;

    let client = SessionClient::new(mock_api_url(&server), seeded_store("access-1", None));
    let list = client.list_courses(Some("jeju"), Some(2)).await.unwrap();

    assert_eq!(list.courses.len(), 1);
    assert_eq!(list.courses[0].title, "Jeju hiking week");
    assert_eq!(list.next_page, Some(3));
}

#[tokio::test]
async fn test_apply_creates_application() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/courses/42/applications"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {
                "id": 7,
                "course_id": 42,
                "status": "pending",
                "applied_at": "2026-03-01T10:00:00Z"
            }
        })))
        .mount(&server)
        .await;

    let client = SessionClient::new(mock_api_url(&server), seeded_store("access-1", None));
    let application = client.apply(42).await.unwrap();

    assert_eq!(application.course_id, 42);
}

#[tokio::test]
async fn test_logout_clears_tokens_even_if_server_call_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = seeded_store("access-1", Some("refresh-1"));
    let client = SessionClient::new(mock_api_url(&server), store.clone());

    client.logout().await.unwrap();

    assert!(store.access_token().is_none());
    assert!(store.refresh_token().is_none());
}

#[tokio::test]
async fn test_raw_request_returns_body_unchanged() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/courses/42"))
        .and(header("authorization", "Bearer access-1"))
        .and(header("x-request-id", "abc-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "id": 42 },
            "meta": { "served_by": "cache" }
        })))
        .mount(&server)
        .await;

    let client = SessionClient::new(mock_api_url(&server), seeded_store("access-1", None));

    let mut headers = tripkit_client::HeaderMap::new();
    headers.insert("x-request-id", "abc-123".parse().unwrap());

    let body = client
        .request(tripkit_client::Method::GET, "courses/42", None, Some(&headers))
        .await
        .unwrap();

    // The envelope is not unwrapped for raw requests
    assert_eq!(body["data"]["id"], 42);
    assert_eq!(body["meta"]["served_by"], "cache");
}

#[tokio::test]
async fn test_non_json_error_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_string("Service Unavailable")
                .insert_header("content-type", "text/plain"),
        )
        .mount(&server)
        .await;

    let client = SessionClient::new(mock_api_url(&server), seeded_store("access-1", None));
    let err = client.profile().await.unwrap_err();

    // Should handle non-JSON error gracefully
    assert!(err.to_string().contains("503"));
}
