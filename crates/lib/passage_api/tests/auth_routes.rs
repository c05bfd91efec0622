//! Route tests. Build the router over in-memory stores and a scripted
//! identity provider, then drive it with `oneshot` requests.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use passage_api::config::ApiConfig;
use passage_api::{AppState, router};
use passage_core::auth::jwt::TokenIssuer;
use passage_core::auth::{AuthError, AuthResult};
use passage_core::models::{ProviderIdentity, ProviderToken};
use passage_core::provider::{IdentityProvider, OAuthStateStore};
use passage_core::session::SessionService;
use passage_core::store::{CredentialStore, MemoryCredentialStore, MemoryUserDirectory};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Provider returning a fixed identity; codes starting with `bad` fail to exchange.
struct FixedProvider {
    verified: bool,
}

#[async_trait]
impl IdentityProvider for FixedProvider {
    fn authorization_url(&self, state: &str) -> AuthResult<String> {
        Ok(format!("https://provider.test/auth?state={state}"))
    }

    async fn exchange(&self, code: &str, _redirect_uri: &str) -> AuthResult<ProviderToken> {
        if code.starts_with("bad") {
            return Err(AuthError::ExchangeFailed("invalid_grant".into()));
        }
        Ok(ProviderToken::from_expires_in(
            "provider-token".into(),
            None,
            3600,
            "Bearer".into(),
        ))
    }

    async fn fetch_profile(&self, _access_token: &str) -> AuthResult<ProviderIdentity> {
        Ok(ProviderIdentity {
            id: "google_123".into(),
            email: "test@example.com".into(),
            email_verified: self.verified,
            name: "Test User".into(),
            picture: "https://example.com/picture.jpg".into(),
        })
    }
}

struct TestApp {
    app: Router,
    oauth_state: Arc<OAuthStateStore>,
    credentials: Arc<MemoryCredentialStore>,
}

fn test_app(verified: bool) -> TestApp {
    let credentials = Arc::new(MemoryCredentialStore::new());
    let oauth_state = Arc::new(OAuthStateStore::new());
    let sessions = SessionService::new(
        Arc::new(TokenIssuer::from_secret(b"test-secret")),
        Arc::new(MemoryUserDirectory::new()),
        credentials.clone(),
        Arc::new(FixedProvider { verified }),
    );
    let state = AppState {
        sessions: Arc::new(sessions),
        oauth_state: oauth_state.clone(),
        config: ApiConfig {
            bind_addr: "127.0.0.1:0".into(),
            jwt_secret: "test-secret".into(),
            google_client_id: "client-id".into(),
            google_client_secret: "client-secret".into(),
            google_redirect_uri: "http://localhost:8080/auth/google/login".into(),
        },
    };
    TestApp {
        app: router(state),
        oauth_state,
        credentials,
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("parse JSON")
    };
    (status, json)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn with_bearer(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn login(t: &TestApp) -> Value {
    let state = t.oauth_state.issue();
    let (status, body) = send(
        &t.app,
        post_json("/auth/google/login", json!({"code": "good", "state": state})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body
}

#[tokio::test]
async fn health_reports_ok() {
    let t = test_app(true);
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&t.app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
async fn google_url_redirects_with_fresh_state() {
    let t = test_app(true);
    let req = Request::builder()
        .uri("/auth/google/url")
        .body(Body::empty())
        .unwrap();
    let resp = t.app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);

    let location = resp.headers()[header::LOCATION].to_str().unwrap().to_string();
    let state = location.split("state=").nth(1).expect("state in location");
    assert_eq!(t.oauth_state.len(), 1);
    assert!(t.oauth_state.take(state));
}

#[tokio::test]
async fn login_returns_user_and_tokens() {
    let t = test_app(true);
    let body = login(&t).await;

    assert_eq!(body["user"]["id"], "google_123");
    assert_eq!(body["user"]["email"], "test@example.com");
    assert!(!body["access_token"].as_str().unwrap().is_empty());
    assert!(!body["refresh_token"].as_str().unwrap().is_empty());
    assert!(body["expires_in"].as_i64().unwrap() > chrono::Utc::now().timestamp());
    assert!(t.credentials.get("google_123").await.is_ok());
}

#[tokio::test]
async fn login_via_callback_query() {
    let t = test_app(true);
    let state = t.oauth_state.issue();
    let req = Request::builder()
        .uri(format!("/auth/google/login?code=good&state={state}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&t.app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], "google_123");
}

#[tokio::test]
async fn login_rejects_unknown_state() {
    let t = test_app(true);
    let (status, body) = send(
        &t.app,
        post_json("/auth/google/login", json!({"code": "good", "state": "forged"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(t.credentials.is_empty().await);
}

#[tokio::test]
async fn login_state_cannot_be_replayed() {
    let t = test_app(true);
    let state = t.oauth_state.issue();
    let body = json!({"code": "good", "state": state});
    let (first, _) = send(&t.app, post_json("/auth/google/login", body.clone())).await;
    let (second, _) = send(&t.app, post_json("/auth/google/login", body)).await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_unverified_email_is_forbidden() {
    let t = test_app(false);
    let state = t.oauth_state.issue();
    let (status, body) = send(
        &t.app,
        post_json("/auth/google/login", json!({"code": "good", "state": state})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
    assert!(t.credentials.is_empty().await);
}

#[tokio::test]
async fn login_exchange_failure_is_bad_gateway() {
    let t = test_app(true);
    let state = t.oauth_state.issue();
    let (status, _) = send(
        &t.app,
        post_json("/auth/google/login", json!({"code": "bad-code", "state": state})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn refresh_issues_new_pair() {
    let t = test_app(true);
    let session = login(&t).await;

    let (status, body) = send(
        &t.app,
        post_json(
            "/auth/refresh",
            json!({"refresh_token": session["refresh_token"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(body["access_token"], session["access_token"]);
    assert_ne!(body["refresh_token"], session["refresh_token"]);
}

#[tokio::test]
async fn refresh_rejects_garbage_token() {
    let t = test_app(true);
    let (status, body) = send(
        &t.app,
        post_json("/auth/refresh", json!({"refresh_token": "not-a-real-token"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid refresh token");
    assert!(t.credentials.is_empty().await);
}

#[tokio::test]
async fn me_requires_bearer_token() {
    let t = test_app(true);
    let req = Request::builder().uri("/auth/me").body(Body::empty()).unwrap();
    let (status, _) = send(&t.app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/auth/me")
        .header(header::AUTHORIZATION, "Token abc")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&t.app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_returns_current_user() {
    let t = test_app(true);
    let session = login(&t).await;
    let token = session["access_token"].as_str().unwrap();

    let (status, body) = send(&t.app, with_bearer("GET", "/auth/me", token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "google_123");
    assert_eq!(body["name"], "Test User");
}

#[tokio::test]
async fn refresh_token_is_not_a_bearer_token() {
    let t = test_app(true);
    let session = login(&t).await;
    let token = session["refresh_token"].as_str().unwrap();

    let (status, _) = send(&t.app, with_bearer("GET", "/auth/me", token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_twice_succeeds() {
    let t = test_app(true);
    let session = login(&t).await;
    let token = session["access_token"].as_str().unwrap();

    let (status, body) = send(&t.app, with_bearer("POST", "/auth/logout", token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");
    assert!(t.credentials.is_empty().await);

    let (status, _) = send(&t.app, with_bearer("POST", "/auth/logout", token)).await;
    assert_eq!(status, StatusCode::OK);
}
