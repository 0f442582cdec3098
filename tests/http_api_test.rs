//! Integration tests for the HTTP API: session gate, routes and error bodies

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use stremio_addon_manager::core::service::DirectoryConfig;
use stremio_addon_manager::http::build_router;
use stremio_addon_manager::http::handlers::AppState;
use stremio_addon_manager::{AddonManagerService, ServiceConfig};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestApp {
    _temp_dir: TempDir,
    remote: MockServer,
    router: Router,
}

/// Router backed by temp stores, with the Stremio API and manifests on a mock server
async fn create_test_app() -> TestApp {
    create_test_app_with_body_limit(50 * 1024 * 1024).await
}

async fn create_test_app_with_body_limit(body_limit_bytes: usize) -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let remote = MockServer::start().await;

    let mut config = ServiceConfig::default().with_data_dir(temp_dir.path());
    config.stremio.api_base_url = remote.uri();
    config.directory = DirectoryConfig {
        protected_manifest_urls: vec![],
        ..Default::default()
    };
    config.sync.failure_delay_ms = 0;

    let service = AddonManagerService::new(config).await.unwrap();
    let router = build_router(AppState::new(Arc::new(service)), body_limit_bytes);

    TestApp {
        _temp_dir: temp_dir,
        remote,
        router,
    }
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    router.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Log in as admin and return the `name=value` cookie pair
async fn admin_cookie(router: &Router) -> String {
    let response = send(
        router,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"username": "admin", "password": "password123"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login sets a session cookie")
        .to_str()
        .unwrap()
        .to_string();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn mount_stremio_login(remote: &MockServer, password: &str, key: &str) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_partial_json(json!({"password": password})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": {"authKey": key}})))
        .mount(remote)
        .await;
}

/// Reject every login not matched by an earlier mock, as Stremio does
async fn mount_stremio_login_rejection(remote: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {"message": "Wrong password"}
        })))
        .mount(remote)
        .await;
}

async fn mount_stremio_ok(remote: &MockServer, route: &str) {
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": {"success": true}})))
        .mount(remote)
        .await;
}

async fn mount_manifest(remote: &MockServer, route: &str, id: &str) -> String {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": id,
            "name": format!("Addon {}", id),
            "version": "1.0.0"
        })))
        .mount(remote)
        .await;
    format!("{}{}", remote.uri(), route)
}

/// Test: admin routes without a session return 401 Unauthorized
#[tokio::test]
async fn test_admin_routes_require_session() {
    let app = create_test_app().await;

    let protected_routes = vec![
        (Method::GET, "/api/users"),
        (Method::POST, "/api/users/sync"),
        (Method::DELETE, "/api/users/a@b.com"),
        (Method::POST, "/api/users/a@b.com/sync"),
        (Method::GET, "/api/addons"),
        (Method::DELETE, "/api/addons/x"),
        (Method::GET, "/api/export"),
    ];

    for (method, uri) in protected_routes {
        let response = send(&app.router, method.clone(), uri, None, None).await;
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{} {} should require a session",
            method,
            uri
        );
        assert_eq!(json_body(response).await, json!({"error": "Unauthorized"}));
    }

    let response = send(
        &app.router,
        Method::GET,
        "/api/users",
        Some("addon_manager_session=forged.token.value"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test: public routes answer without a session
#[tokio::test]
async fn test_public_routes() {
    let app = create_test_app().await;

    let response = send(&app.router, Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "OK");
    assert_eq!(body["version"], stremio_addon_manager::VERSION);
    assert!(body["timestamp"].is_string());

    let response = send(&app.router, Method::GET, "/manifest.json", None, None).await;
    let body = json_body(response).await;
    assert_eq!(body["id"], "community.stremio.addons-index");
    assert_eq!(body["catalogs"][0]["id"], "community");

    let response = send(&app.router, Method::GET, "/catalog.json", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!([]));

    let response = send(
        &app.router,
        Method::GET,
        "/catalog/addon/community.json",
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    for uri in ["/catalog/movie/top.json", "/catalog/addon/community"] {
        let response = send(&app.router, Method::GET, uri, None, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(
            json_body(response).await,
            json!({"error": "Catalog not found"})
        );
    }
}

/// Test: admin login, status, logout cycle
#[tokio::test]
async fn test_admin_login_and_logout() {
    let app = create_test_app().await;

    let response = send(
        &app.router,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"username": "admin", "password": "wrong"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Invalid credentials"})
    );

    let response = send(&app.router, Method::GET, "/api/auth/status", None, None).await;
    assert_eq!(
        json_body(response).await,
        json!({"isAuthenticated": false, "stremioConnected": false, "stremioUser": null})
    );

    let cookie = admin_cookie(&app.router).await;

    let response = send(&app.router, Method::GET, "/api/auth/status", Some(&cookie), None).await;
    assert_eq!(json_body(response).await["isAuthenticated"], true);

    let response = send(&app.router, Method::GET, "/api/users", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!([]));

    let response = send(&app.router, Method::POST, "/api/logout", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cleared.contains("Max-Age=0"));

    let response = send(&app.router, Method::GET, "/api/users", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test: the session token is also accepted as a bearer token
#[tokio::test]
async fn test_bearer_token_is_accepted() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.router).await;
    let token = cookie.split_once('=').unwrap().1;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/addons")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

/// Test: adding the same manifest URL twice is rejected and the registry keeps one entry
#[tokio::test]
async fn test_add_duplicate_addon() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.router).await;
    let url = mount_manifest(&app.remote, "/a/manifest.json", "x").await;

    let response = send(
        &app.router,
        Method::POST,
        "/api/addons",
        Some(&cookie),
        Some(json!({"url": url})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"success": true, "message": "Addon added successfully"})
    );

    let response = send(
        &app.router,
        Method::POST,
        "/api/addons",
        Some(&cookie),
        Some(json!({"url": url})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Addon already exists"})
    );

    let response = send(&app.router, Method::GET, "/api/addons", Some(&cookie), None).await;
    let addons = json_body(response).await;
    assert_eq!(addons.as_array().unwrap().len(), 1);
    assert_eq!(addons[0]["transportName"], "http");
    assert_eq!(addons[0]["manifest"]["id"], "x");
}

/// Test: addon validation and not-found responses
#[tokio::test]
async fn test_addon_errors() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.router).await;

    let response = send(
        &app.router,
        Method::POST,
        "/api/addons",
        Some(&cookie),
        Some(json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Manifest URL is required"})
    );

    let response = send(
        &app.router,
        Method::DELETE,
        "/api/addons/missing",
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await, json!({"error": "Addon not found"}));
}

/// Test: wrong Stremio password leaves the user registry unchanged
#[tokio::test]
async fn test_add_user_with_wrong_password() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.router).await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {"message": "Wrong password"}
        })))
        .mount(&app.remote)
        .await;

    let response = send(
        &app.router,
        Method::POST,
        "/api/users",
        Some(&cookie),
        Some(json!({"email": "a@b.com", "password": "wrong"})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Invalid Stremio credentials"})
    );

    let response = send(&app.router, Method::GET, "/api/users", Some(&cookie), None).await;
    assert_eq!(json_body(response).await, json!([]));
}

/// Test: sync for an unknown email is 404
#[tokio::test]
async fn test_sync_unknown_user() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.router).await;

    let response = send(
        &app.router,
        Method::POST,
        "/api/users/nobody@b.com/sync",
        Some(&cookie),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await, json!({"error": "User not found"}));
}

/// Test: add a user, sync it, then observe the stamped lastSync
#[tokio::test]
async fn test_add_and_sync_user() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.router).await;
    mount_stremio_login(&app.remote, "pw", "key-1").await;
    mount_stremio_ok(&app.remote, "/logout").await;
    Mock::given(method("POST"))
        .and(path("/addonCollectionSet"))
        .and(body_partial_json(json!({
            "authKey": "key-1",
            "addons": [{"manifest": {"id": "org.stremio.local"}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": {"success": true}})))
        .expect(1)
        .mount(&app.remote)
        .await;

    let response = send(
        &app.router,
        Method::POST,
        "/api/users",
        Some(&cookie),
        Some(json!({"email": "a@b.com", "password": "pw"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app.router,
        Method::POST,
        "/api/users",
        Some(&cookie),
        Some(json!({"email": "a@b.com", "password": "pw"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"error": "User already exists"})
    );

    let response = send(
        &app.router,
        Method::POST,
        "/api/users/a@b.com/sync",
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["outcome"], "complete");
    assert_eq!(body["protectedCount"], 1);
    assert!(body["lastSync"].is_string());

    let response = send(&app.router, Method::GET, "/api/users", Some(&cookie), None).await;
    let users = json_body(response).await;
    assert_eq!(users[0]["email"], "a@b.com");
    assert_eq!(users[0]["lastSync"], body["lastSync"]);
    assert!(users[0].get("password").is_none());
}

/// Test: a sync whose Stremio login is rejected is 401
#[tokio::test]
async fn test_sync_with_rejected_login() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.router).await;
    mount_stremio_login(&app.remote, "pw", "key-1").await;

    let response = send(
        &app.router,
        Method::POST,
        "/api/users",
        Some(&cookie),
        Some(json!({"email": "a@b.com", "password": "pw"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Password changed on the Stremio side
    app.remote.reset().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "nope"})))
        .mount(&app.remote)
        .await;

    let response = send(
        &app.router,
        Method::POST,
        "/api/users/a@b.com/sync",
        Some(&cookie),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Failed to authenticate with Stremio"})
    );
}

/// Test: bulk sync continues past a failing user and reports each result
#[tokio::test]
async fn test_sync_all_users_reports_each_user() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.router).await;
    mount_stremio_login(&app.remote, "pw-a", "key-a").await;
    mount_stremio_login(&app.remote, "pw-b", "key-b").await;
    mount_stremio_ok(&app.remote, "/logout").await;

    for (email, password) in [("a@b.com", "pw-a"), ("b@b.com", "pw-b")] {
        let response = send(
            &app.router,
            Method::POST,
            "/api/users",
            Some(&cookie),
            Some(json!({"email": email, "password": password})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    // b@b.com changed their password on the Stremio side
    app.remote.reset().await;
    mount_stremio_login(&app.remote, "pw-a", "key-a").await;
    mount_stremio_login_rejection(&app.remote).await;
    mount_stremio_ok(&app.remote, "/logout").await;
    Mock::given(method("POST"))
        .and(path("/addonCollectionSet"))
        .and(body_partial_json(json!({"authKey": "key-a"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": {"success": true}})))
        .expect(1)
        .mount(&app.remote)
        .await;

    let response = send(&app.router, Method::POST, "/api/users/sync", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let results = json_body(response).await;
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 2);

    assert_eq!(results[0]["email"], "a@b.com");
    assert_eq!(results[0]["success"], true);
    assert_eq!(results[0]["report"]["outcome"], "complete");
    assert!(results[0].get("error").is_none());

    assert_eq!(results[1]["email"], "b@b.com");
    assert_eq!(results[1]["success"], false);
    assert!(results[1]["error"].is_string());
    assert!(results[1].get("report").is_none());

    let response = send(&app.router, Method::GET, "/api/users", Some(&cookie), None).await;
    let users = json_body(response).await;
    assert!(users[0]["lastSync"].is_string());
    assert!(users[1].get("lastSync").map_or(true, Value::is_null));
}

/// Test: bulk import reports per-entry outcomes and export returns the registry
#[tokio::test]
async fn test_import_and_export() {
    let app = create_test_app().await;
    let cookie = admin_cookie(&app.router).await;

    let entry = |id: &str| {
        json!({
            "manifest": {"id": id, "name": id, "version": "1.0.0"},
            "transportUrl": format!("https://{}.example/manifest.json", id)
        })
    };

    let response = send(
        &app.router,
        Method::POST,
        "/api/import",
        Some(&cookie),
        Some(json!([
            entry("a"),
            entry("b"),
            entry("a"),
            {"transportUrl": "https://no-manifest.example/manifest.json"},
            {"manifest": {"id": "c"}, "transportUrl": "https://c.example/manifest.json"}
        ])),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"success": true, "results": {"success": 2, "failed": 2, "duplicates": 1}})
    );

    let response = send(&app.router, Method::GET, "/api/export", Some(&cookie), None).await;
    let exported = json_body(response).await;
    let ids: Vec<&str> = exported
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["manifest"]["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
}

/// Test: Stremio login through the API marks the session as connected
#[tokio::test]
async fn test_stremio_login_connects_session() {
    let app = create_test_app().await;
    mount_stremio_login(&app.remote, "pw", "key-1").await;
    mount_stremio_login_rejection(&app.remote).await;

    let response = send(
        &app.router,
        Method::POST,
        "/api/stremio/login",
        None,
        Some(json!({"email": "a@b.com", "password": "bad"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Invalid credentials"})
    );

    let response = send(
        &app.router,
        Method::POST,
        "/api/stremio/login",
        None,
        Some(json!({"email": "a@b.com", "password": "pw"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let response = send(&app.router, Method::GET, "/api/auth/status", Some(&cookie), None).await;
    assert_eq!(
        json_body(response).await,
        json!({
            "isAuthenticated": false,
            "stremioConnected": true,
            "stremioUser": {"email": "a@b.com"}
        })
    );
}

/// Test: registration errors carry the remote message
#[tokio::test]
async fn test_stremio_register_error() {
    let app = create_test_app().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {"message": "Email already registered"}
        })))
        .mount(&app.remote)
        .await;

    let response = send(
        &app.router,
        Method::POST,
        "/api/stremio/register",
        None,
        Some(json!({"email": "a@b.com", "password": "pw"})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Email already registered"})
    );

    let response = send(
        &app.router,
        Method::POST,
        "/api/stremio/register",
        None,
        Some(json!({"email": "not-an-email", "password": ""})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Validation failed");
}

/// Test: unreadable request bodies still answer with an `{error}` object
#[tokio::test]
async fn test_malformed_bodies_are_json_errors() {
    let app = create_test_app().await;

    let response = send(
        &app.router,
        Method::POST,
        "/api/stremio/register",
        None,
        Some(json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("email"));

    let response = send(&app.router, Method::POST, "/api/login", None, None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());
}

/// Test: bodies over the configured limit are rejected with 413
#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let app = create_test_app_with_body_limit(64).await;

    let response = send(
        &app.router,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"username": "admin", "password": "x".repeat(256)})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(json_body(response).await["error"].is_string());
}
