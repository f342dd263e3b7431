//! Integration test helpers
//!
//! Each test gets its own server on a random port, backed by an in-memory
//! database and a mailer that keeps confirmation codes for inspection.

#![allow(dead_code)]

use reqwest::Method;
use serde_json::{json, Value};
use std::sync::{Arc, LazyLock};
use tokio::net::TcpListener;
use uuid::Uuid;
use yamdb_web::{auth::mailer::MemoryMailer, AppState, WebConfig};

pub const ADMIN_USERNAME: &str = "root";
pub const ADMIN_EMAIL: &str = "root@yamdb.local";

// Tracing is initialized once per test binary
static TRACING: LazyLock<()> = LazyLock::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::sink)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
});

/// Running test application
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub mailer: Arc<MemoryMailer>,
    pub state: AppState,
}

impl TestApp {
    /// Send a request, optionally with a bearer token and JSON body
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> reqwest::Response {
        let mut request = self
            .api_client
            .request(method, format!("{}{}", &self.address, path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        self.request(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: &Value) -> reqwest::Response {
        self.request(Method::POST, path, token, Some(body)).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: &Value) -> reqwest::Response {
        self.request(Method::PUT, path, token, Some(body)).await
    }

    pub async fn patch(&self, path: &str, token: Option<&str>, body: &Value) -> reqwest::Response {
        self.request(Method::PATCH, path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        self.request(Method::DELETE, path, token, None).await
    }

    /// Start signup for a pair
    pub async fn post_signup(&self, username: &str, email: &str) -> reqwest::Response {
        self.post(
            "/api/v1/auth/signup",
            None,
            &json!({ "username": username, "email": email }),
        )
        .await
    }

    /// Exchange a confirmation code for a token
    pub async fn post_token(&self, username: &str, code: &str) -> reqwest::Response {
        self.post(
            "/api/v1/auth/token",
            None,
            &json!({ "username": username, "confirmation_code": code }),
        )
        .await
    }

    /// Code from the last confirmation mail sent to `email`
    pub fn mailed_code(&self, email: &str) -> String {
        let mail = self
            .mailer
            .last_to(email)
            .expect("No confirmation mail was sent");
        mail.body
            .split_whitespace()
            .last()
            .expect("Mail body is empty")
            .to_string()
    }

    /// Full signup and confirmation; returns the access token
    pub async fn login(&self, username: &str, email: &str) -> String {
        let response = self.post_signup(username, email).await;
        assert_eq!(response.status().as_u16(), 200, "signup failed");

        let code = self.mailed_code(email);
        let response = self.post_token(username, &code).await;
        assert_eq!(response.status().as_u16(), 200, "token exchange failed");

        let body: Value = response.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    /// Token for the bootstrap administrator
    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_USERNAME, ADMIN_EMAIL).await
    }

    /// Register a fresh user with the given role and return their token
    pub async fn user_with_role(&self, role: &str) -> (TestUser, String) {
        let user = TestUser::generate();
        let admin = self.admin_token().await;
        let response = self
            .post(
                "/api/v1/users",
                Some(&admin),
                &json!({ "username": user.username, "email": user.email, "role": role }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201, "user creation failed");

        let token = self.login(&user.username, &user.email).await;
        (user, token)
    }

    /// Category, genre and one title; returns the title id
    pub async fn seed_title(&self, admin: &str) -> i64 {
        let response = self
            .post(
                "/api/v1/categories",
                Some(admin),
                &json!({ "name": "Films", "slug": "films" }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);

        let response = self
            .post(
                "/api/v1/genres",
                Some(admin),
                &json!({ "name": "Drama", "slug": "drama" }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);

        let response = self
            .post(
                "/api/v1/titles",
                Some(admin),
                &json!({
                    "name": "The Godfather",
                    "year": 1972,
                    "description": "Crime saga",
                    "genre": ["drama"],
                    "category": "films"
                }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);

        let body: Value = response.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }
}

/// Start a test application
pub async fn spawn_app() -> TestApp {
    LazyLock::force(&TRACING);

    let config = WebConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        dev_mode: true,
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "integration-test-secret".to_string(),
        admin_username: Some(ADMIN_USERNAME.to_string()),
        admin_email: Some(ADMIN_EMAIL.to_string()),
        ..WebConfig::default()
    };

    let mailer = Arc::new(MemoryMailer::new(config.mail_from.clone()));
    let state = AppState::with_mailer(config, mailer.clone()).await.unwrap();
    let app = yamdb_web::create_app(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        api_client: client,
        mailer,
        state,
    }
}

/// Test user data
pub struct TestUser {
    pub username: String,
    pub email: String,
}

impl TestUser {
    pub fn generate() -> Self {
        let id = Uuid::new_v4().simple().to_string();
        Self {
            username: format!("user_{}", &id[..8]),
            email: format!("user_{}@example.com", &id[..8]),
        }
    }
}
