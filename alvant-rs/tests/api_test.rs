//! HTTP-level tests driving the router directly

use alvant_rs::api::{ApiServer, AppState};
use alvant_rs::clock::SystemClock;
use alvant_rs::config::{Config, RuntimeMode};
use alvant_rs::notify::OtpNotifier;
use alvant_rs::storage::Database;
use alvant_rs::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

#[derive(Default)]
struct RecordingNotifier {
    codes: Mutex<Vec<String>>,
}

#[async_trait]
impl OtpNotifier for RecordingNotifier {
    async fn send(&self, _destination: &str, code: &str) -> Result<()> {
        self.codes.lock().unwrap().push(code.to_string());
        Ok(())
    }
}

struct TestApp {
    router: Router,
    notifier: Arc<RecordingNotifier>,
}

async fn test_app() -> TestApp {
    let mut config = Config::default();
    config.runtime.mode = RuntimeMode::Production;
    config.admin.email = "owner@alvant.test".to_string();
    config.admin.jwt_secret = "api-test-secret".to_string();

    let db = Database::in_memory().await.unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let state = AppState::new(&config, db, notifier.clone(), Arc::new(SystemClock)).unwrap();

    TestApp {
        router: ApiServer::new(state, &config.server).router(),
        notifier,
    }
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn login(app: &TestApp) -> String {
    let (status, _) = send(
        &app.router,
        Method::POST,
        "/api/admin/request-otp",
        Some(json!({ "email": "owner@alvant.test" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let code: u32 = app.notifier.codes.lock().unwrap().last().unwrap().parse().unwrap();
    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/admin/verify-otp",
        Some(json!({ "email": "owner@alvant.test", "otp": code })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

fn contact() -> Value {
    json!({
        "name": "Layla Haddad",
        "email": "Layla@Example.com",
        "phone": "+971 50 123 4567",
        "message": "  Please call me back ",
        "categories": ["Logistics"],
    })
}

#[tokio::test]
async fn test_root_and_health() {
    let app = test_app().await;

    let (status, body) = send(&app.router, Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endpoints"]["health"], "/api/health");

    let (status, body) = send(&app.router, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["connected"], true);
}

#[tokio::test]
async fn test_unknown_api_path() {
    let app = test_app().await;

    let (status, body) = send(&app.router, Method::GET, "/api/nowhere", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "API endpoint not found");
    assert_eq!(body["path"], "/api/nowhere");
}

#[tokio::test]
async fn test_admin_login_and_verify_token() {
    let app = test_app().await;
    let token = login(&app).await;

    let (status, body) = send(
        &app.router,
        Method::GET,
        "/api/admin/verify-token",
        None,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["admin"]["email"], "owner@alvant.test");
}

#[tokio::test]
async fn test_code_is_single_use() {
    let app = test_app().await;
    login(&app).await;

    let code = app.notifier.codes.lock().unwrap().last().unwrap().clone();
    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/admin/verify-otp",
        Some(json!({ "email": "owner@alvant.test", "code": code })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "OTP expired or not requested");
}

#[tokio::test]
async fn test_admin_errors() {
    let app = test_app().await;

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/admin/verify-otp",
        Some(json!({ "email": "owner@alvant.test", "otp": "123456" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "OTP not requested");

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/admin/request-otp",
        Some(json!({ "email": "someone@else.test" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["error"],
        "Unauthorized email address. Please use the registered admin email."
    );
    assert!(app.notifier.codes.lock().unwrap().is_empty());

    let (status, _) = send(&app.router, Method::GET, "/api/admin/verify-token", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app.router,
        Method::GET,
        "/api/admin/verify-token",
        None,
        Some("not-a-token"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = test_app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/admin/request-otp")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\":"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_contact_submission_and_listing() {
    let app = test_app().await;

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/contact",
        Some(json!({ "name": "L", "email": "bad", "phone": "12", "categories": [] })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    for field in ["name", "email", "phone", "categories"] {
        assert!(body["errors"][field].is_string(), "missing error for {}", field);
    }

    let mut wrong_shape = contact();
    wrong_shape["categories"] = json!("Logistics");
    let (status, body) = send(&app.router, Method::POST, "/api/contact", Some(wrong_shape), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"]["categories"], "Please select at least one category");

    let (status, body) = send(&app.router, Method::POST, "/api/contact", Some(contact()), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Contact saved successfully");

    let (status, _) = send(&app.router, Method::GET, "/api/contact", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login(&app).await;
    let (status, body) = send(&app.router, Method::GET, "/api/contact", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let contacts = body.as_array().unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0]["email"], "layla@example.com");
    assert_eq!(contacts[0]["message"], "Please call me back");
}

#[tokio::test]
async fn test_registration_submission_and_listing() {
    let app = test_app().await;

    let registration = json!({
        "companyName": "Haddad Trading",
        "firstName": "Layla",
        "lastName": "Haddad",
        "jobTitle": "Director",
        "phone": "0501234567",
        "email": "layla@haddad.test",
        "hasUAE": "Yes",
        "multiCountry": "No",
        "lineOfBusiness": ["Retail"],
        "categories": [],
        "productInterest": ["Fleet"],
        "markets": ["UAE"],
        "services": [],
    });

    let (status, body) = send(&app.router, Method::POST, "/api/register", Some(registration), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Registration saved");
    assert_eq!(body["data"]["companyName"], "Haddad Trading");
    assert_eq!(body["data"]["hasUAE"], "Yes");

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/register",
        Some(json!({ "hasUAE": "Maybe" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["hasUAE"].is_string());

    let token = login(&app).await;
    let (status, body) = send(&app.router, Method::GET, "/api/register", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}
