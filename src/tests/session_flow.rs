use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::tests::test_support::{RecordingNavigator, client_with};
use crate::{Credential, Error, Identity, MemoryTokenStore, RouteDecision, RouteTarget, TokenStore};

#[tokio::test]
async fn login_stores_credential_identity_and_arms_guard() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user/login"))
        .and(body_json(json!({ "email": "kim@example.com", "password": "hunter2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "token": "tok-1",
            "tokenType": "Bearer",
            "expiresIn": 3600,
            "user": { "name": "Kim", "email": "kim@example.com" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/me"))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("me"))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let client = client_with(&server.uri(), navigator.clone(), store.clone());

    let identity = client
        .login("kim@example.com", "hunter2")
        .await
        .expect("login should succeed");

    assert_eq!(identity.display_name(), "Kim");
    assert_eq!(
        store.get().map(|c| c.as_str().to_string()),
        Some("tok-1".into())
    );
    assert!(client.guard().is_signed_in());
    assert!(client.signed_in_at().is_some());

    let response = client.get("/api/me").await.expect("authenticated call");
    assert_eq!(response.body, "me");
}

#[tokio::test]
async fn rejected_login_leaves_no_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let client = client_with(&server.uri(), navigator.clone(), store.clone());

    match client.login("kim@example.com", "wrong").await {
        Err(Error::LoginRejected(status, body)) => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(body, "bad credentials");
        }
        other => panic!("expected Error::LoginRejected, got {other:?}"),
    }
    assert!(store.get().is_none());
    assert!(!client.guard().is_signed_in());
}

#[tokio::test]
async fn login_response_without_token_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let client = client_with(&server.uri(), navigator, store.clone());

    assert!(matches!(
        client.login("kim@example.com", "hunter2").await,
        Err(Error::LoginRejected(_, _))
    ));
    assert!(store.get().is_none());
}

#[tokio::test]
async fn login_without_success_flag_is_rejected_despite_a_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let client = client_with(&server.uri(), navigator, store.clone());

    assert!(matches!(
        client.login("kim@example.com", "hunter2").await,
        Err(Error::LoginRejected(_, _))
    ));
    assert!(store.get().is_none());
    assert!(!client.guard().is_signed_in());
}

#[tokio::test]
async fn logout_clears_locally_even_when_server_refuses() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "token": "tok-1"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/user/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let client = client_with(&server.uri(), navigator.clone(), store.clone());

    client.login("kim@example.com", "hunter2").await.expect("login");
    client.logout().await;

    assert!(store.get().is_none());
    assert!(!client.guard().is_signed_in());
    assert!(client.signed_in_at().is_none());
    // Explicit logout is not a terminal failure; no forced redirect.
    assert_eq!(navigator.redirects(), 0);
}

#[tokio::test]
async fn restore_reenters_signed_in_state_without_a_network_call() {
    let store = Arc::new(MemoryTokenStore::new());
    store.set(Credential::new("tok-1"));
    let navigator = Arc::new(RecordingNavigator::default());
    // Unroutable address: restore must not touch the network.
    let client = client_with("http://127.0.0.1:9", navigator, store.clone());

    assert!(client.restore(Some(Identity {
        name: Some("Kim".into()),
        email: None,
    })));
    assert!(client.guard().is_signed_in());
    assert_eq!(
        client.guard().identity().and_then(|i| i.name),
        Some("Kim".into())
    );
    assert_eq!(
        client.gate().check(&RouteTarget::protected("/")),
        RouteDecision::Proceed
    );
}

#[tokio::test]
async fn restore_without_credential_reports_logged_out() {
    let store = Arc::new(MemoryTokenStore::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let client = client_with("http://127.0.0.1:9", navigator, store);

    assert!(!client.restore(None));
    assert!(!client.guard().is_signed_in());
    assert_eq!(
        client.gate().check(&RouteTarget::protected("/community/write")),
        RouteDecision::RedirectToLogin {
            resume: "/community/write".into()
        }
    );
}
