//! Gateway behavior against a mock backend: credential attachment,
//! envelope decoding, and 401-driven session teardown.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use konto_client::api::{RegisterRequest, TokenCreateRequest};
use konto_client::{
    AccountApi, AdminApi, AuthEvent, ClientConfig, Gateway, Identity, Quota, Role, SessionStore,
    TokenApi, UserStatus,
};

fn identity(username: &str, access_token: Option<&str>) -> Identity {
    Identity {
        id: 1,
        username: username.to_string(),
        display_name: None,
        email: None,
        role: Role::User,
        status: UserStatus::Enabled,
        access_token: access_token.map(str::to_string),
        quota: None,
    }
}

fn setup(dir: &TempDir, server: &MockServer) -> (Arc<SessionStore>, Arc<Gateway>) {
    let session = Arc::new(SessionStore::new(dir.path().join("session.toml")));
    let config = ClientConfig {
        api_url: server.uri(),
    };
    let gateway = Arc::new(Gateway::new(&config, session.clone()).unwrap());
    (session, gateway)
}

fn self_envelope(username: &str) -> serde_json::Value {
    json!({
        "success": true,
        "message": "",
        "data": {
            "id": 1,
            "username": username,
            "role": 1,
            "status": 1
        }
    })
}

#[tokio::test]
async fn bearer_header_is_attached_when_identity_has_access_token() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    let (session, gateway) = setup(&dir, &server);

    session
        .establish(identity("alice", Some("tok-123")))
        .await
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/user/self"))
        .and(header("Authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(self_envelope("alice")))
        .expect(1)
        .mount(&server)
        .await;

    let fetched = gateway.fetch_self().await.unwrap();
    assert_eq!(fetched.username, "alice");
}

#[tokio::test]
async fn no_authorization_header_without_access_token() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    let (session, gateway) = setup(&dir, &server);

    session.establish(identity("bob", None)).await.unwrap();

    Mock::given(method("GET"))
        .and(path("/api/user/self"))
        .respond_with(ResponseTemplate::new(200).set_body_json(self_envelope("bob")))
        .mount(&server)
        .await;

    gateway.fetch_self().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn unauthorized_response_clears_session_and_emits_event() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    let (session, gateway) = setup(&dir, &server);

    session
        .establish(identity("alice", Some("stale-token")))
        .await
        .unwrap();
    let mut events = gateway.subscribe();

    Mock::given(method("GET"))
        .and(path("/api/user"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let admin = AdminApi::new(gateway.clone());
    let err = admin.list(1, 10).await.unwrap_err();
    assert!(err.is_auth_error());

    // local teardown happened as a side effect, snapshot included
    assert!(!session.is_authenticated());
    assert!(!dir.path().join("session.toml").exists());
    assert_eq!(events.try_recv().unwrap(), AuthEvent::AuthorizationLost);
}

#[tokio::test]
async fn business_failure_surfaces_server_message_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    let (_session, gateway) = setup(&dir, &server);

    Mock::given(method("POST"))
        .and(path("/api/user/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "用戶名或密碼錯誤，或用戶已被封禁"
        })))
        .mount(&server)
        .await;

    let account = AccountApi::new(gateway);
    let err = account.login("alice", "wrong-password").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "API error: 用戶名或密碼錯誤，或用戶已被封禁"
    );
}

#[tokio::test]
async fn user_listing_paginates_and_computes_total_pages() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    let (session, gateway) = setup(&dir, &server);

    session
        .establish(Identity {
            role: Role::Root,
            ..identity("admin", Some("root-token"))
        })
        .await
        .unwrap();

    let users: Vec<serde_json::Value> = (11..=20)
        .map(|i| json!({"id": i, "username": format!("user{}", i), "role": 1, "status": 1}))
        .collect();

    Mock::given(method("GET"))
        .and(path("/api/user"))
        .and(query_param("page", "2"))
        .and(query_param("page_size", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "",
            "data": users,
            "total": 25
        })))
        .expect(1)
        .mount(&server)
        .await;

    let admin = AdminApi::new(gateway);
    let page = admin.list(2, 10).await.unwrap();
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.total, 25);
    assert_eq!(page.total_pages(), 3);
}

#[tokio::test]
async fn local_validation_failure_makes_no_network_call() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    let (_session, gateway) = setup(&dir, &server);

    let account = AccountApi::new(gateway);
    let err = account
        .register(RegisterRequest {
            username: "carol".to_string(),
            password: "short1".to_string(),
            email: None,
        })
        .await
        .unwrap_err();

    assert!(err.is_validation_error());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn unlimited_token_creation_sends_zero_numeric_quota() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    let (session, gateway) = setup(&dir, &server);

    session
        .establish(identity("alice", Some("tok-123")))
        .await
        .unwrap();

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_partial_json(json!({
            "name": "ci",
            "unlimited_quota": true,
            "remain_quota": 0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "",
            "data": {
                "id": 7,
                "user_id": 1,
                "key": "sk-new",
                "name": "ci",
                "status": 1,
                "created_time": "2026-08-05T00:00:00Z",
                "accessed_time": "2026-08-05T00:00:00Z",
                "expired_time": "2036-08-05T00:00:00Z",
                "remain_quota": 0,
                "unlimited_quota": true
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = TokenApi::new(gateway);
    let created = tokens
        .create(TokenCreateRequest::new("ci", Quota::Unlimited))
        .await
        .unwrap();
    assert_eq!(created.key, "sk-new");
    assert_eq!(created.quota(), Quota::Unlimited);
}

#[tokio::test]
async fn non_success_status_passes_through_as_http_error() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    let (session, gateway) = setup(&dir, &server);

    session
        .establish(identity("alice", Some("tok-123")))
        .await
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/user/self"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&server)
        .await;

    let err = gateway.fetch_self().await.unwrap_err();
    assert!(!err.is_auth_error());
    assert!(err.to_string().contains("backend exploded"));
    // a 5xx is not an authorization failure: no teardown
    assert!(session.is_authenticated());
}
