mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{
    PASSWORD, TEST_SECRET, TEST_TTL, body_json, create_test_app, get, get_with_bearer,
    get_with_cookie, json_request, register, session_token, set_cookie, test_config,
};
use serde_json::json;
use std::time::Duration;
use strength_tracker::create_app;
use strength_tracker::jwt::{JwtConfig, unix_now};
use tower::ServiceExt;

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let app = create_test_app().await;
    register(&app, "alice@example.com", None).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "email": "alice@example.com", "password": PASSWORD }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = set_cookie(&response).unwrap();
    assert!(cookie.starts_with("auth_token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains(&format!("Max-Age={}", TEST_TTL.as_secs())));
    assert!(!cookie.contains("Secure"));

    let token = session_token(&response).unwrap();
    let json = body_json(response).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["user"]["email"], "alice@example.com");
    assert_eq!(json["user"]["name"], "Test User");
    // The token only travels in the cookie.
    assert!(!json.to_string().contains(&token));
    let subject = json["user"]["sub"].as_str().unwrap().to_string();

    // The login cookie alone opens a protected route as the same subject.
    let response = app
        .oneshot(get_with_cookie("/api/auth/me", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["sub"], subject.as_str());
}

#[tokio::test]
async fn test_production_cookie_is_secure() {
    let mut config = test_config().await;
    config.secure_cookies = true;
    let app = create_app(&config);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            json!({ "email": "alice@example.com", "password": PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response).unwrap().ends_with("; Secure"));

    let response = app
        .oneshot(json_request("POST", "/api/auth/logout", json!({})))
        .await
        .unwrap();
    assert!(set_cookie(&response).unwrap().ends_with("; Secure"));
}

#[tokio::test]
async fn test_me_returns_caller_identity() {
    let app = create_test_app().await;
    let token = register(&app, "alice@example.com", None).await;

    let response = app
        .oneshot(get_with_cookie("/api/auth/me", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["email"], "alice@example.com");
    assert_eq!(json["name"], "Test User");
    assert!(json["sub"].as_str().is_some_and(|s| !s.is_empty()));
}

#[tokio::test]
async fn test_every_auth_failure_looks_the_same() {
    let app = create_test_app().await;
    register(&app, "alice@example.com", None).await;

    let expired = JwtConfig::new(TEST_SECRET, Duration::from_secs(60))
        .mint_at("someone", "someone@example.com", None, 1_000)
        .unwrap()
        .token;

    let requests = vec![
        get("/api/auth/me"),
        get_with_cookie("/api/auth/me", "not-a-token"),
        get_with_cookie("/api/auth/me", &expired),
        get_with_bearer("/api/auth/me", "not-a-token"),
        json_request(
            "POST",
            "/api/auth/login",
            json!({ "email": "alice@example.com", "password": "wrong-password" }),
        ),
        json_request(
            "POST",
            "/api/auth/login",
            json!({ "email": "nobody@example.com", "password": PASSWORD }),
        ),
    ];

    for request in requests {
        let uri = request.uri().to_string();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
        assert!(set_cookie(&response).is_none(), "rejections keep the cookie");
        assert_eq!(body_json(response).await, json!({ "error": "Unauthorized" }));
    }
}

#[tokio::test]
async fn test_login_with_phone_number() {
    let app = create_test_app().await;
    register(&app, "alice@example.com", Some("5551234567")).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "phoneNumber": "5551234567", "password": PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_token(&response).is_some());
    assert_eq!(body_json(response).await["user"]["email"], "alice@example.com");

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "phoneNumber": "5550000000", "password": PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_requires_identifier() {
    let app = create_test_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "password": PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_validation() {
    let app = create_test_app().await;

    let cases = [
        json!({ "email": "not-an-email", "password": PASSWORD }),
        json!({ "email": "alice@example.com", "password": "12345" }),
        json!({ "email": "", "password": PASSWORD }),
    ];

    for body in cases {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/auth/register", body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);
        assert!(set_cookie(&response).is_none());
    }
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = create_test_app().await;
    register(&app, "alice@example.com", None).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            json!({ "email": "ALICE@example.com", "password": PASSWORD }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(set_cookie(&response).is_none());
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = create_test_app().await;

    // Works without a session.
    let response = app
        .oneshot(json_request("POST", "/api/auth/logout", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie(&response).unwrap();
    assert!(cookie.starts_with("auth_token=;"));
    assert!(cookie.contains("Max-Age=0"));
    assert!(cookie.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
    assert_eq!(body_json(response).await["ok"], true);
}

#[tokio::test]
async fn test_bearer_only_request_is_authenticated() {
    let app = create_test_app().await;
    let token = register(&app, "alice@example.com", None).await;

    let response = app
        .clone()
        .oneshot(get_with_bearer("/api/auth/me", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let lowercase = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(lowercase).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cookie_takes_precedence_over_bearer() {
    let app = create_test_app().await;
    let alice = register(&app, "alice@example.com", None).await;
    let bob = register(&app, "bob@example.com", None).await;

    let both = |cookie: &str, bearer: &str| {
        Request::builder()
            .uri("/api/auth/me")
            .header(header::COOKIE, format!("auth_token={}", cookie))
            .header(header::AUTHORIZATION, format!("Bearer {}", bearer))
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(both(&alice, &bob)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["email"], "alice@example.com");

    // An invalid cookie is not rescued by a valid header.
    let response = app.clone().oneshot(both("garbage", &bob)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // An empty cookie counts as absent.
    let response = app.oneshot(both("", &bob)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["email"], "bob@example.com");
}

#[tokio::test]
async fn test_token_expiry_boundary() {
    let app = create_test_app().await;
    let jwt = JwtConfig::new(TEST_SECRET, TEST_TTL);
    let now = unix_now().unwrap();

    // Issued a full TTL ago minus a margin: still valid.
    let fresh = jwt
        .mint_at("user", "user@example.com", None, now - TEST_TTL.as_secs() + 60)
        .unwrap()
        .token;
    let response = app
        .clone()
        .oneshot(get_with_cookie("/api/auth/me", &fresh))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stale = jwt
        .mint_at("user", "user@example.com", None, now - TEST_TTL.as_secs() - 1)
        .unwrap()
        .token;
    let response = app
        .oneshot(get_with_cookie("/api/auth/me", &stale))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_from_other_secret_rejected() {
    let app = create_test_app().await;

    let other = JwtConfig::new(b"a-completely-different-secret-value", TEST_TTL)
        .mint("user", "user@example.com", None)
        .unwrap()
        .token;
    let response = app
        .clone()
        .oneshot(get_with_cookie("/api/auth/me", &other))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let rotated = JwtConfig::new(TEST_SECRET, TEST_TTL)
        .with_key_version(2)
        .mint("user", "user@example.com", None)
        .unwrap()
        .token;
    let response = app
        .oneshot(get_with_cookie("/api/auth/me", &rotated))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_public_routes_ignore_bad_tokens() {
    let app = create_test_app().await;

    let response = app
        .clone()
        .oneshot(get_with_cookie("/api/health", "garbage"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "ok" }));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .header(header::COOKIE, "auth_token=garbage")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
