#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use serde_json::Value;
use std::time::Duration;
use strength_tracker::{ServerConfig, create_app, db::Database};
use tower::ServiceExt;

pub const TEST_SECRET: &[u8] = b"test-jwt-secret-that-is-long-enough!";
pub const TEST_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
pub const PASSWORD: &str = "hunter22";

pub async fn test_config() -> ServerConfig {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    ServerConfig {
        db,
        jwt_secret: TEST_SECRET.to_vec(),
        jwt_key_version: 1,
        session_ttl: TEST_TTL,
        secure_cookies: false,
        // Lowest cost bcrypt accepts, keeps tests fast.
        bcrypt_cost: 4,
    }
}

pub async fn create_test_app() -> Router {
    create_app(&test_config().await)
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_cookie(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, format!("auth_token={}", token))
        .body(Body::empty())
        .unwrap()
}

pub fn get_with_bearer(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// The first `Set-Cookie` header of a response.
pub fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// The session token set by a response.
pub fn session_token(response: &Response<Body>) -> Option<String> {
    let cookie = set_cookie(response)?;
    let (name_value, _) = cookie.split_once(';')?;
    let token = name_value.strip_prefix("auth_token=")?;
    (!token.is_empty()).then(|| token.to_string())
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Register a user and return its session token.
pub async fn register(app: &Router, email: &str, phone_number: Option<&str>) -> String {
    let mut body = serde_json::json!({
        "email": email,
        "password": PASSWORD,
        "name": "Test User",
    });
    if let Some(phone) = phone_number {
        body["phoneNumber"] = Value::from(phone);
    }

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/register", body))
        .await
        .unwrap();
    assert_eq!(response.status(), 200, "registration failed");
    session_token(&response).expect("registration should set a session cookie")
}
