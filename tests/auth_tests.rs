mod common;

use axum::{body::Body, http::StatusCode};
use common::{
    TEST_PASSWORD, TestApp, bearer_request, json_body, json_request, request, set_cookie,
};
use rafalift::jwt::TokenType;
use serde_json::json;
use std::time::Duration;

// --- Register ---

#[tokio::test]
async fn test_register_creates_user() {
    let app = TestApp::new().await;

    let response = app
        .send(json_request(
            "POST",
            "/auth/register",
            json!({ "name": "Alice", "email": " Alice@Example.com ", "password": TEST_PASSWORD }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = json_body(response).await;
    assert_eq!(json["name"], "Alice");
    assert_eq!(json["email"], "alice@example.com");

    let user = app
        .db
        .users()
        .get_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(user.password_hash, TEST_PASSWORD);
    assert!(user.password_hash.starts_with("$2"));
}

#[tokio::test]
async fn test_register_rejects_existing_email() {
    let app = TestApp::new().await;
    app.seed_user("Alice", "alice@example.com").await;

    let response = app
        .send(json_request(
            "POST",
            "/auth/register",
            json!({ "name": "Alice", "email": "ALICE@example.com", "password": TEST_PASSWORD }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_validates_input() {
    let app = TestApp::new().await;

    let cases = [
        json!({ "name": " ", "email": "a@example.com", "password": TEST_PASSWORD }),
        json!({ "name": "A", "email": "not-an-email", "password": TEST_PASSWORD }),
        json!({ "name": "A", "email": "a@example.com", "password": "short" }),
    ];
    for body in cases {
        let response = app.send(json_request("POST", "/auth/register", body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

// --- Login ---

#[tokio::test]
async fn test_login_returns_token_pair_and_cookie() {
    let app = TestApp::new().await;
    app.seed_user("Alice", "alice@example.com").await;

    let response = app
        .send(json_request(
            "POST",
            "/auth/login",
            json!({ "login": "alice@example.com", "password": TEST_PASSWORD }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = set_cookie(&response).unwrap();
    let json = json_body(response).await;

    let access = json["access_token"].as_str().unwrap();
    let refresh = json["refresh_token"].as_str().unwrap();

    let access_claims = app.jwt.verify(access).unwrap();
    let refresh_claims = app.jwt.verify(refresh).unwrap();
    assert_eq!(access_claims.token_type, TokenType::Access);
    assert_eq!(refresh_claims.token_type, TokenType::Refresh);
    assert_eq!(access_claims.sub, "alice@example.com");
    assert_eq!(refresh_claims.sub, "alice@example.com");
    assert!(access_claims.exp < refresh_claims.exp);

    assert!(cookie.starts_with(&format!("jwt={};", access)));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=900"));
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = TestApp::new().await;
    app.seed_user("Alice", "alice@example.com").await;

    let wrong_password = app
        .send(json_request(
            "POST",
            "/auth/login",
            json!({ "login": "alice@example.com", "password": "wrong password" }),
        ))
        .await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);

    let unknown_user = app
        .send(json_request(
            "POST",
            "/auth/login",
            json!({ "login": "bob@example.com", "password": TEST_PASSWORD }),
        ))
        .await;
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_is_rate_limited() {
    let app = TestApp::new().await;

    let attempt = || {
        json_request(
            "POST",
            "/auth/login",
            json!({ "login": "nobody@example.com", "password": "wrong password" }),
        )
    };

    for _ in 0..5 {
        let response = app.send(attempt()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = app.send(attempt()).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

// --- Refresh ---

#[tokio::test]
async fn test_login_then_refresh_issues_access_token_only() {
    let app = TestApp::new().await;
    app.seed_user("Alice", "alice@example.com").await;
    let (_access, refresh) = app.login("alice@example.com").await;

    let response = app
        .send(bearer_request("POST", "/auth/refresh", &refresh))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert!(json.get("refresh_token").is_none());

    let claims = app.jwt.verify(json["access_token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.token_type, TokenType::Access);
    assert_eq!(claims.sub, "alice@example.com");
}

#[tokio::test]
async fn test_refresh_from_body() {
    let app = TestApp::new().await;
    app.seed_user("Alice", "alice@example.com").await;
    let (_access, refresh) = app.login("alice@example.com").await;

    let response = app
        .send(json_request(
            "POST",
            "/auth/refresh",
            json!({ "refresh_token": refresh }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_without_token_is_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .send(request("POST", "/auth/refresh").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_with_access_token_is_unauthorized() {
    let app = TestApp::new().await;
    app.seed_user("Alice", "alice@example.com").await;
    let (access, _refresh) = app.login("alice@example.com").await;

    let response = app
        .send(json_request(
            "POST",
            "/auth/refresh",
            json!({ "refresh_token": access }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_with_garbage_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app
        .send(bearer_request("POST", "/auth/refresh", "not.a.token"))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deleted_user_cannot_refresh() {
    let app = TestApp::new().await;
    let id = app.seed_user("Alice", "alice@example.com").await;
    let (_access, refresh) = app.login("alice@example.com").await;

    app.db.users().delete(id).await.unwrap();

    let response = app
        .send(bearer_request("POST", "/auth/refresh", &refresh))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_with_foreign_secret_is_unauthorized() {
    let app = TestApp::new().await;
    app.seed_user("Alice", "alice@example.com").await;

    let other = rafalift::jwt::JwtConfig::new(b"a-completely-different-secret-value").unwrap();
    let forged = other
        .sign("alice@example.com", TokenType::Refresh, Duration::from_secs(600))
        .unwrap();

    let response = app
        .send(bearer_request("POST", "/auth/refresh", &forged.token))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// --- Check / validate / logout ---

#[tokio::test]
async fn test_check_and_validate_with_access_token() {
    let app = TestApp::new().await;
    app.seed_user("Alice", "alice@example.com").await;
    let (access, _refresh) = app.login("alice@example.com").await;

    let check = app.send(bearer_request("GET", "/auth/check", &access)).await;
    assert_eq!(check.status(), StatusCode::OK);

    let validate = app
        .send(bearer_request("GET", "/auth/validate", &access))
        .await;
    assert_eq!(validate.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_check_with_cookie() {
    let app = TestApp::new().await;
    app.seed_user("Alice", "alice@example.com").await;
    let (access, _refresh) = app.login("alice@example.com").await;

    let response = app
        .send(
            request("GET", "/auth/check")
                .header("cookie", format!("jwt={}", access))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = TestApp::new().await;

    let response = app
        .send(request("POST", "/auth/logout").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = set_cookie(&response).unwrap();
    assert!(cookie.starts_with("jwt=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_access_token_survives_logout() {
    let app = TestApp::new().await;
    app.seed_user("Alice", "alice@example.com").await;
    let (access, _refresh) = app.login("alice@example.com").await;

    let logout = app
        .send(bearer_request("POST", "/auth/logout", &access))
        .await;
    assert_eq!(logout.status(), StatusCode::OK);

    // Stateless tokens: nothing was revoked
    let check = app.send(bearer_request("GET", "/auth/check", &access)).await;
    assert_eq!(check.status(), StatusCode::OK);
}
