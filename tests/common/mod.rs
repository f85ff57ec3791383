#![allow(dead_code)]

use blog_backend::config::jwt::JwtConfig;
use blog_backend::models::{PostModel, UserModel};
use blog_backend::services::{auth::AuthService, post::PostService};
use blog_backend::utils::JwtService;
use reqwest::Client;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const TEST_JWT_SECRET: &str = "integration_test_secret_that_is_at_least_32_characters_long";
pub const TEST_PASSWORD: &str = "test_password_123";

static USER_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.addr, path)
    }
}

pub fn test_jwt() -> JwtService {
    let config = JwtConfig::new(TEST_JWT_SECRET.to_string(), 3600).unwrap();
    JwtService::new(&config)
}

/// Fresh in-memory SQLite database with the schema applied.
///
/// The pool is pinned to a single connection: every connection to
/// `sqlite::memory:` would otherwise open its own empty database.
pub async fn setup_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:".to_string());
    opt.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .expect("Failed to open in-memory database");

    blog_backend::migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

pub async fn spawn_app() -> TestApp {
    let db = setup_db().await;

    let app = axum::Router::new()
        .route("/", axum::routing::get(|| async { "ok" }))
        .merge(blog_backend::routes::create_routes())
        .layer(axum::extract::Extension(db.clone()))
        .layer(axum::extract::Extension(test_jwt()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        addr: format!("http://{}", addr),
        db,
        client: Client::new(),
    }
}

pub fn unique_username(prefix: &str) -> String {
    let counter = USER_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}_{}", prefix, counter)
}

/// Register a user over HTTP, log in, and return (user_id, token).
pub async fn create_test_user(app: &TestApp, username_prefix: &str) -> (i32, String) {
    let username = unique_username(username_prefix);

    let resp = app
        .client
        .post(app.url("/users/register"))
        .json(&serde_json::json!({
            "username": username,
            "password": TEST_PASSWORD
        }))
        .send()
        .await
        .expect("Failed to register user");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("Failed to parse register response");
    if !body["success"].as_bool().unwrap_or(false) {
        panic!(
            "Failed to register user '{}': status={}, body={}",
            username, status, body
        );
    }
    let user_id = body["data"]["user_id"]
        .as_i64()
        .expect("Register response missing user_id") as i32;

    let resp = app
        .client
        .post(app.url("/users/login"))
        .json(&serde_json::json!({
            "username": username,
            "password": TEST_PASSWORD
        }))
        .send()
        .await
        .expect("Failed to log in");

    let body: serde_json::Value = resp.json().await.expect("Failed to parse login response");
    let token = body["data"]["token"]
        .as_str()
        .unwrap_or_else(|| panic!("Login response missing token: {}", body))
        .to_string();

    (user_id, token)
}

/// Create a post over HTTP and return its id.
pub async fn create_test_post(app: &TestApp, token: &str, title: &str) -> i32 {
    let resp = app
        .client
        .post(app.url("/posts"))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "title": title,
            "content": "test content"
        }))
        .send()
        .await
        .expect("Failed to create post");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("Failed to parse post response");
    if !body["success"].as_bool().unwrap_or(false) {
        panic!("Failed to create post: status={}, body={}", status, body);
    }
    body["data"]["id"].as_i64().expect("Post response missing id") as i32
}

/// Register a user directly through the service layer.
pub async fn insert_user(db: &DatabaseConnection, username_prefix: &str) -> UserModel {
    AuthService::new(db.clone(), test_jwt())
        .register(&unique_username(username_prefix), TEST_PASSWORD)
        .await
        .expect("Failed to register user")
}

pub async fn insert_post(db: &DatabaseConnection, author: &UserModel, title: &str) -> PostModel {
    PostService::new(db.clone())
        .create(author.id, title, "test content")
        .await
        .expect("Failed to create post")
}
