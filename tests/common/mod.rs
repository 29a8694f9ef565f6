#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{HeaderName, Request, Response, header},
};
use rafalift::{
    ServerConfig, create_app,
    db::{Database, UserRole},
    jwt::JwtConfig,
    password::PasswordHasher,
    session::SessionConfig,
};
use tower::ServiceExt;

pub const TEST_SECRET: &[u8] = b"test-jwt-secret-that-is-long-enough";
pub const TEST_IP: &str = "192.0.2.10";
pub const TEST_PASSWORD: &str = "correct horse battery";

/// Lowest bcrypt cost; keeps the tests fast.
pub fn hasher() -> PasswordHasher {
    PasswordHasher::new(4)
}

pub struct TestApp {
    pub router: Router,
    pub db: Database,
    pub jwt: JwtConfig,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = Database::open(":memory:")
            .await
            .expect("Failed to open test database");
        let config = ServerConfig {
            db: db.clone(),
            jwt_secret: TEST_SECRET.to_vec(),
            session: SessionConfig::default(),
            secure_cookies: false,
            client_ip_header: Some(HeaderName::from_static("x-forwarded-for")),
            hasher: hasher(),
            rate_limit: None,
        };
        let router = create_app(&config).expect("Failed to create app");
        let jwt = JwtConfig::new(TEST_SECRET).unwrap();
        Self { router, db, jwt }
    }

    /// Send a request through a clone of the router.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Insert a user with [`TEST_PASSWORD`] directly into the store.
    pub async fn seed_user(&self, name: &str, email: &str) -> i64 {
        let hash = hasher().hash(TEST_PASSWORD).unwrap();
        self.db
            .users()
            .create(name, email, &hash, UserRole::User)
            .await
            .unwrap()
    }

    /// Log in through the API and return (access_token, refresh_token).
    pub async fn login(&self, email: &str) -> (String, String) {
        let response = self
            .send(json_request(
                "POST",
                "/auth/login",
                serde_json::json!({ "login": email, "password": TEST_PASSWORD }),
            ))
            .await;
        assert_eq!(response.status(), axum::http::StatusCode::OK);

        let json = json_body(response).await;
        (
            json["access_token"].as_str().unwrap().to_string(),
            json["refresh_token"].as_str().unwrap().to_string(),
        )
    }
}

/// A request builder carrying the client IP header.
pub fn request(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", TEST_IP)
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    request(method, uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn bearer_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    request(method, uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub fn bearer_json_request(
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Request<Body> {
    request(method, uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
