//! End-to-end session scenarios: bootstrap, login, authenticated calls
//! and logout against a mock backend.

use std::sync::Arc;

use roomgen_core::auth::{FileSessionStore, MemorySessionStore, RegisterOutcome, SessionStore};
use roomgen_core::models::{Credentials, Registration};
use roomgen_core::{ApiClient, Destination, Route, RouteGuard};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_designs(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/designs/my-designs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "d1", "roomType": "bedroom", "style": "modern", "isFavorite": false}
        ])))
        .mount(server)
        .await;
}

fn authorization_headers(requests: &[wiremock::Request]) -> Vec<Option<String>> {
    requests
        .iter()
        .map(|r| {
            r.headers
                .get("authorization")
                .map(|v| v.to_str().unwrap().to_string())
        })
        .collect()
}

#[tokio::test]
async fn anonymous_bootstrap_sends_no_credentials() {
    let server = MockServer::start().await;
    mount_designs(&server).await;

    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let api = ApiClient::with_endpoints(&format!("{}/api", server.uri()), None, store.clone()).unwrap();
    let mut guard = RouteGuard::new(store);

    assert_eq!(guard.bootstrap().await, Route::Anonymous);
    assert_eq!(guard.route().destination(), Some(Destination::Login));

    api.get_my_designs().await.unwrap();
    let requests = server.received_requests().await.unwrap();
    assert_eq!(authorization_headers(&requests), vec![None]);
}

#[tokio::test]
async fn login_stores_token_for_subsequent_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "a@b.com", "password": "secret1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "T1",
            "user": {"_id": "u1", "firstName": "Ada", "lastName": "Lovelace", "email": "a@b.com"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/profile"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "firstName": "Ada", "lastName": "Lovelace", "email": "a@b.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let api = ApiClient::with_endpoints(&format!("{}/api", server.uri()), None, store.clone()).unwrap();
    let mut guard = RouteGuard::new(store.clone());
    guard.bootstrap().await;

    let route = guard
        .login(&api, &Credentials::new("a@b.com", "secret1"))
        .await
        .unwrap();
    assert_eq!(route, Route::Authenticated);
    assert_eq!(store.get().await.unwrap().as_deref(), Some("T1"));

    let profile = api.get_profile().await.unwrap();
    assert_eq!(profile.email, "a@b.com");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        authorization_headers(&requests),
        vec![None, Some("Bearer T1".to_string())]
    );
}

#[tokio::test]
async fn login_without_token_stays_anonymous() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .mount(&server)
        .await;

    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let api = ApiClient::with_endpoints(&format!("{}/api", server.uri()), None, store.clone()).unwrap();
    let mut guard = RouteGuard::new(store.clone());
    guard.bootstrap().await;

    let err = guard
        .login(&api, &Credentials::new("a@b.com", "secret1"))
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Invalid credentials");
    assert_eq!(guard.route(), Route::Anonymous);
    assert_eq!(store.get().await.unwrap(), None);
}

#[tokio::test]
async fn rejected_login_leaves_store_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid email or password"})),
        )
        .mount(&server)
        .await;

    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::with_token("previous"));
    let api = ApiClient::with_endpoints(&format!("{}/api", server.uri()), None, store.clone()).unwrap();
    let mut guard = RouteGuard::new(store.clone());

    let err = guard
        .login(&api, &Credentials::new("a@b.com", "wrong1"))
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.user_message(), "Invalid email or password");
    assert_eq!(store.get().await.unwrap().as_deref(), Some("previous"));
}

#[tokio::test]
async fn register_with_and_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({
            "email": "new@b.com", "password": "secret1", "firstName": "Grace", "lastName": "Hopper"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"token": "R1"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({
            "email": "later@b.com", "password": "secret1", "firstName": "Alan", "lastName": "Turing"
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"message": "Registration successful"})),
        )
        .mount(&server)
        .await;

    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let api = ApiClient::with_endpoints(&format!("{}/api", server.uri()), None, store.clone()).unwrap();
    let mut guard = RouteGuard::new(store.clone());
    guard.bootstrap().await;

    let deferred = Registration {
        email: "later@b.com".to_string(),
        password: "secret1".to_string(),
        first_name: "Alan".to_string(),
        last_name: "Turing".to_string(),
    };
    let outcome = guard.register(&api, &deferred).await.unwrap();
    assert_eq!(
        outcome,
        RegisterOutcome::LoginRequired {
            message: Some("Registration successful".to_string())
        }
    );
    assert_eq!(guard.route(), Route::Anonymous);

    let immediate = Registration {
        email: "new@b.com".to_string(),
        password: "secret1".to_string(),
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
    };
    let outcome = guard.register(&api, &immediate).await.unwrap();
    assert_eq!(outcome, RegisterOutcome::LoggedIn);
    assert_eq!(guard.route(), Route::Authenticated);
    assert_eq!(store.get().await.unwrap().as_deref(), Some("R1"));
}

#[tokio::test]
async fn short_password_is_rejected_before_sending() {
    let server = MockServer::start().await;
    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let api = ApiClient::with_endpoints(&format!("{}/api", server.uri()), None, store.clone()).unwrap();
    let mut guard = RouteGuard::new(store);

    let registration = Registration {
        email: "a@b.com".to_string(),
        password: "12345".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
    };
    let err = guard.register(&api, &registration).await.unwrap_err();
    assert_eq!(err.user_message(), "Password must be at least 6 characters long");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn logout_returns_to_anonymous_and_stops_sending_token() {
    let server = MockServer::start().await;
    mount_designs(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(dir.path().to_path_buf()));
    store.set("T2").await.unwrap();

    let api = ApiClient::with_endpoints(&format!("{}/api", server.uri()), None, store.clone()).unwrap();
    let mut guard = RouteGuard::new(store.clone());
    assert_eq!(guard.bootstrap().await, Route::Authenticated);

    api.get_my_designs().await.unwrap();
    assert_eq!(guard.logout().await.unwrap(), Route::Anonymous);
    assert_eq!(store.get().await.unwrap(), None);
    api.get_my_designs().await.unwrap();

    // A fresh bootstrap after logout also lands at login
    let mut restarted = RouteGuard::new(Arc::new(FileSessionStore::new(dir.path().to_path_buf())));
    assert_eq!(restarted.bootstrap().await, Route::Anonymous);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        authorization_headers(&requests),
        vec![Some("Bearer T2".to_string()), None]
    );
}
