//! Integration tests for session refresh, replay and expiry

use serde_json::json;
use skillswap_api::{
    ApiClient, ClientError, MemorySessionStore, RefreshMode, RetryPolicy, SessionState,
    SessionStore, SessionTokens, StoreError, Theme,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn expired() -> SessionState {
    SessionState::Expired {
        redirect_to: "/login".into(),
    }
}

fn client_with(
    server: &MockServer,
    store: &MemorySessionStore,
    mode: RefreshMode,
) -> ApiClient {
    ApiClient::builder()
        .api_url(format!("{}/api", server.uri()))
        .store(Arc::new(store.clone()))
        .refresh_mode(mode)
        .build()
        .unwrap()
}

fn session_body(access: &str, refresh: &str) -> serde_json::Value {
    json!({ "session": { "access_token": access, "refresh_token": refresh } })
}

#[tokio::test]
async fn test_refreshes_and_replays_after_401() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "jwt expired" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({ "refresh_token": "r1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body("abc456", "r2")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .and(header("authorization", "Bearer abc456"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": 7, "content": "replayed" }])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = MemorySessionStore::with_tokens(&SessionTokens::new("abc123", "r1"));
    let client = client_with(&server, &store, RefreshMode::Independent);

    let posts = client.posts().await.unwrap();
    assert_eq!(posts[0].content.as_deref(), Some("replayed"));

    assert_eq!(store.access_token().as_deref(), Some("abc456"));
    assert_eq!(store.refresh_token().as_deref(), Some("r2"));
    assert_eq!(client.session_state(), SessionState::Active);

    // The refresh call itself carries no bearer credential
    let requests = server.received_requests().await.unwrap();
    let refresh = requests
        .iter()
        .find(|r| r.url.path() == "/auth/refresh")
        .unwrap();
    assert!(refresh.headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_replays_request_body_after_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/posts"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body("abc456", "r2")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/posts"))
        .and(header("authorization", "Bearer abc456"))
        .and(body_json(json!({ "content": "hello", "image_url": null })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 3, "content": "hello" })))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemorySessionStore::with_tokens(&SessionTokens::new("abc123", "r1"));
    let client = client_with(&server, &store, RefreshMode::Independent);

    let post = client
        .create_post(&skillswap_api::types::NewPost {
            content: "hello".into(),
            image_url: None,
        })
        .await
        .unwrap();
    assert_eq!(post.id.to_string(), "3");
}

#[tokio::test]
async fn test_second_401_expires_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body("abc456", "r2")))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemorySessionStore::with_tokens(&SessionTokens::new("abc123", "r1"));
    let client = client_with(&server, &store, RefreshMode::Independent);
    let mut states = client.subscribe();

    let err = client.posts().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(_)));
    assert!(err.is_unauthorized());

    assert!(!store.has_session());
    assert_eq!(*states.borrow_and_update(), expired());
}

#[tokio::test]
async fn test_refresh_failure_expires_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid refresh token" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = MemorySessionStore::with_tokens(&SessionTokens::new("abc123", "r1"));
    let client = client_with(&server, &store, RefreshMode::Independent);

    let err = client
        .notifications(skillswap_api::types::Page::default())
        .await
        .unwrap_err();
    match &err {
        ClientError::RefreshFailed(inner) => match inner.as_ref() {
            ClientError::BackendMessage { status, message } => {
                assert_eq!(*status, 401);
                assert_eq!(message, "Invalid refresh token");
            }
            other => panic!("unexpected refresh error: {other:?}"),
        },
        other => panic!("expected refresh failure, got {other:?}"),
    }
    assert!(err.is_unauthorized());
    assert!(!store.has_session());
    assert_eq!(client.session_state(), expired());
}

#[tokio::test]
async fn test_malformed_refresh_reply_expires_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/skills/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemorySessionStore::with_tokens(&SessionTokens::new("abc123", "r1"));
    let client = client_with(&server, &store, RefreshMode::Independent);

    let err = client.my_skills().await.unwrap_err();
    assert!(matches!(err, ClientError::RefreshFailed(_)));
    assert!(!store.has_session());
    assert_eq!(client.session_state(), expired());
}

#[tokio::test]
async fn test_401_without_session_expires_without_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = MemorySessionStore::new();
    let client = client_with(&server, &store, RefreshMode::Independent);
    let mut states = client.subscribe();

    let err = client.me().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(_)));
    assert!(states.has_changed().unwrap());
    assert_eq!(*states.borrow_and_update(), expired());
}

/// Store holding an access token but never a refresh token
#[derive(Default)]
struct AccessOnlyStore {
    access: Mutex<Option<String>>,
}

impl SessionStore for AccessOnlyStore {
    fn access_token(&self) -> Option<String> {
        self.access.lock().unwrap().clone()
    }

    fn refresh_token(&self) -> Option<String> {
        None
    }

    fn store_tokens(&self, tokens: &SessionTokens) -> Result<(), StoreError> {
        *self.access.lock().unwrap() = Some(tokens.access_token.clone());
        Ok(())
    }

    fn clear_tokens(&self) -> Result<(), StoreError> {
        *self.access.lock().unwrap() = None;
        Ok(())
    }

    fn theme(&self) -> Option<Theme> {
        None
    }

    fn store_theme(&self, _theme: Theme) -> Result<(), StoreError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_missing_refresh_token_clears_access_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(AccessOnlyStore::default());
    store
        .store_tokens(&SessionTokens::new("abc123", "unused"))
        .unwrap();
    let client = ApiClient::builder()
        .api_url(format!("{}/api", server.uri()))
        .store(store.clone())
        .build()
        .unwrap();
    assert_eq!(client.session_state(), SessionState::LoggedOut);

    let err = client.me().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(store.access_token(), None);
    assert_eq!(client.session_state(), expired());
}

#[tokio::test]
async fn test_no_retry_policy_expires_on_first_401() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "jwt expired" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = MemorySessionStore::with_tokens(&SessionTokens::new("abc123", "r1"));
    let client = ApiClient::builder()
        .api_url(format!("{}/api", server.uri()))
        .store(Arc::new(store.clone()))
        .retry_policy(RetryPolicy::no_retry())
        .build()
        .unwrap();

    match client.posts().await {
        Err(ClientError::Unauthorized(message)) => assert_eq!(message, "jwt expired"),
        other => panic!("expected unauthorized, got {other:?}"),
    }
    assert!(!store.has_session());
}

async fn mount_concurrent_scenario(server: &MockServer, refreshes: u64) {
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(200)))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body("abc456", "r2")))
        .expect(refreshes)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .and(header("authorization", "Bearer abc456"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_concurrent_401s_refresh_independently() {
    let server = MockServer::start().await;
    mount_concurrent_scenario(&server, 2).await;

    let store = MemorySessionStore::with_tokens(&SessionTokens::new("abc123", "r1"));
    let client = client_with(&server, &store, RefreshMode::Independent);

    let (first, second) = tokio::join!(client.posts(), client.posts());
    assert!(first.is_ok());
    assert!(second.is_ok());
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh_when_coalesced() {
    let server = MockServer::start().await;
    mount_concurrent_scenario(&server, 1).await;

    let store = MemorySessionStore::with_tokens(&SessionTokens::new("abc123", "r1"));
    let client = client_with(&server, &store, RefreshMode::Coalesced);

    let (first, second) = tokio::join!(client.posts(), client.posts());
    assert!(first.is_ok());
    assert!(second.is_ok());
    assert_eq!(store.access_token().as_deref(), Some("abc456"));
}
