//! Router-level tests that need no database: accounts live in the in-memory
//! repository and every handler that reaches sea-orm is avoided.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;

use server::routes::{self, auth::ServerState};
use service::auth::domain::RegisterInput;
use service::auth::repository::{mock::MockAuthRepository, AuthRepository};
use service::auth::service::{AuthConfig, AuthService};
use service::images::MediaStore;

const EMAIL: &str = "owner@salon.test";
const PASSWORD: &str = "Sup3rSecret";

struct TestApp {
    app: Router,
    repo: Arc<MockAuthRepository>,
}

async fn test_app() -> anyhow::Result<TestApp> {
    let repo = Arc::new(MockAuthRepository::default());
    let dyn_repo: Arc<dyn AuthRepository> = repo.clone();
    let auth = Arc::new(AuthService::new(dyn_repo, AuthConfig::with_secret("test-secret")));
    auth.register(RegisterInput { email: EMAIL.into(), name: "Owner".into(), password: PASSWORD.into(), is_staff: true })
        .await?;

    let media_root = std::env::temp_dir().join(format!("salon-auth-flow-{}", uuid::Uuid::new_v4()));
    let state = ServerState {
        db: DatabaseConnection::Disconnected,
        auth,
        media: MediaStore::new(media_root, "/media/", None),
        public_url: None,
        quotes_tz: chrono_tz::Europe::Moscow,
    };
    Ok(TestApp { app: routes::build_app(state, tower_http::cors::CorsLayer::very_permissive()), repo })
}

async fn send(app: &Router, req: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    Ok((status, body))
}

fn post_json(uri: &str, body: Value) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body)?))?)
}

fn get_with_token(uri: &str, token: &str) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())?)
}

async fn login(app: &Router) -> anyhow::Result<(String, String)> {
    let (status, body) = send(app, post_json("/api/auth/", json!({"login": EMAIL, "password": PASSWORD}))?).await?;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    let access = body["access_token"].as_str().unwrap_or_default().to_string();
    let refresh = body["refresh_token"].as_str().unwrap_or_default().to_string();
    assert!(!access.is_empty() && !refresh.is_empty());
    Ok((access, refresh))
}

#[tokio::test]
async fn health_with_and_without_trailing_slash() -> anyhow::Result<()> {
    let t = test_app().await?;
    for uri in ["/health", "/health/"] {
        let (status, body) = send(&t.app, Request::builder().uri(uri).body(Body::empty())?).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }
    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> anyhow::Result<()> {
    let t = test_app().await?;
    let (status, body) = send(&t.app, Request::builder().uri("/api/schema/openapi.json").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/random-quote/"].is_object());
    Ok(())
}

#[tokio::test]
async fn login_success_and_failures() -> anyhow::Result<()> {
    let t = test_app().await?;
    login(&t.app).await?;

    // without the trailing slash too
    let (status, _) = send(&t.app, post_json("/api/auth", json!({"login": EMAIL, "password": PASSWORD}))?).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&t.app, post_json("/api/auth/", json!({"login": EMAIL, "password": "wrong-one"}))?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid credentials");

    let (status, _) = send(&t.app, post_json("/api/auth/", json!({"login": EMAIL}))?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    t.repo.set_active(EMAIL, false);
    let (status, body) = send(&t.app, post_json("/api/auth/", json!({"login": EMAIL, "password": PASSWORD}))?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "account disabled");
    Ok(())
}

#[tokio::test]
async fn refresh_rotates_and_rejects_reuse() -> anyhow::Result<()> {
    let t = test_app().await?;
    let (_, refresh) = login(&t.app).await?;

    let (status, body) = send(&t.app, post_json("/api/auth/refresh/", json!({"refresh_token": refresh}))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["refresh_token"].as_str().is_some_and(|r| r != refresh));

    let (status, body) = send(&t.app, post_json("/api/auth/refresh/", json!({"refresh_token": refresh}))?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "invalid refresh token"}));

    let (status, _) = send(&t.app, post_json("/api/auth/refresh/", json!({}))?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn management_routes_require_an_access_token() -> anyhow::Result<()> {
    let t = test_app().await?;
    let (access, refresh) = login(&t.app).await?;

    let (status, body) = send(&t.app, Request::builder().uri("/api/services/").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "authentication credentials were not provided");

    let (status, body) = send(&t.app, get_with_token("/api/services/", &refresh)?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid token");

    let (status, _) = send(&t.app, get_with_token("/api/masters", "not-a-jwt")?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    t.repo.set_active(EMAIL, false);
    let (status, _) = send(&t.app, get_with_token("/api/contacts/", &access)?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn validation_runs_before_storage() -> anyhow::Result<()> {
    let t = test_app().await?;
    let (access, _) = login(&t.app).await?;

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/quotes/")
        .header(header::AUTHORIZATION, format!("Bearer {access}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"author": "Anon"}"#))?;
    let (status, body) = send(&t.app, req).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "text is required");

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/quotes/")
        .header(header::AUTHORIZATION, format!("Bearer {access}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))?;
    let (status, body) = send(&t.app, req).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid request body");
    Ok(())
}

#[tokio::test]
async fn products_cannot_be_edited() -> anyhow::Result<()> {
    let t = test_app().await?;
    let (access, _) = login(&t.app).await?;
    for method in [Method::PUT, Method::PATCH] {
        let req = Request::builder()
            .method(method)
            .uri("/api/products/1/")
            .header(header::AUTHORIZATION, format!("Bearer {access}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))?;
        let resp = t.app.clone().oneshot(req).await?;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
    Ok(())
}

fn multipart(access: &str, parts: &[(&str, Option<&str>, &[u8])]) -> anyhow::Result<Request<Body>> {
    let boundary = "salonboundary";
    let mut body = Vec::new();
    for (name, filename, data) in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        match filename {
            Some(f) => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n").as_bytes(),
            ),
            None => body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes()),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    Ok(Request::builder()
        .method(Method::POST)
        .uri("/api/images/")
        .header(header::AUTHORIZATION, format!("Bearer {access}"))
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))?)
}

#[tokio::test]
async fn image_upload_rejects_bad_forms() -> anyhow::Result<()> {
    let t = test_app().await?;
    let (access, _) = login(&t.app).await?;

    let (status, body) = send(&t.app, multipart(&access, &[("compress", None, b"true")])?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "original_image is required");

    let (status, body) = send(&t.app, multipart(&access, &[("original_image", Some("a.png"), b"x"), ("crop", None, b"perhaps")])?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "crop must be a boolean");

    let (status, _) = send(&t.app, multipart(&access, &[("original_image", Some("notes.txt"), b"hello")])?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}
