//! Test utilities for integration testing (available with `test-utils` feature).
//!
//! Apps built here run on the in-memory backend, so none of this needs a database.

use axum_test::TestServer;
use serde_json::json;

use crate::{
    auth::password::{CredentialHasher, Md5Hex},
    config::{Config, DatabaseConfig},
    db::store::Stores,
    types::{SessionToken, UserId},
};

pub fn create_test_config() -> Config {
    Config {
        database: DatabaseConfig::Memory,
        ..Default::default()
    }
}

/// Test server plus handles to its storage, for seeding users.
pub async fn create_test_app() -> (TestServer, Stores) {
    create_test_app_with_config(create_test_config()).await
}

pub async fn create_test_app_with_config(config: Config) -> (TestServer, Stores) {
    let app = crate::Application::new(config).await.expect("Failed to create application");
    app.into_test_server()
}

/// Provision a user whose password hash matches the default (MD5) hasher.
pub async fn create_test_user(stores: &Stores, login: &str, password: &str) -> UserId {
    let hash = Md5Hex.hash(password).expect("Failed to hash password");
    stores
        .provisioner
        .upsert_user(login, &hash)
        .await
        .expect("Failed to create test user")
}

/// Log in through the API and return the issued token.
pub async fn login(server: &TestServer, login: &str, password: &str) -> SessionToken {
    let response = server.post("/api/auth").json(&json!({"login": login, "password": password})).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    SessionToken::new(body["token"].as_str().expect("Login response has no token"))
}

/// `Authorization` header value for a token
pub fn bearer(token: &SessionToken) -> String {
    format!("Bearer {token}")
}
