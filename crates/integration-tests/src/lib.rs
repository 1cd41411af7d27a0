//! Integration tests for Giglet.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p giglet-cli -- migrate
//!
//! # Start the API server
//! cargo run -p giglet-api
//!
//! # Run the ignored end-to-end tests
//! cargo test -p giglet-integration-tests -- --ignored
//! ```
//!
//! Tests live in `tests/` and talk to a running server over HTTP; they are
//! all `#[ignore]`d so `cargo test` stays green without one.

use reqwest::Client;
use serde_json::{Value, json};

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("GIGLET_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// A registered account plus its API token.
#[derive(Debug, Clone)]
pub struct TestAccount {
    pub user_id: i64,
    pub username: String,
    pub token: String,
}

/// Register a fresh account with a unique username, returning its token.
///
/// # Panics
///
/// Panics if the registration request fails; these helpers run inside
/// tests only.
pub async fn register_account(client: &Client, account_type: &str) -> TestAccount {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let username = format!("it_{account_type}_{}", &suffix[..12]);

    let resp = client
        .post(format!("{}/registration/", base_url()))
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "integration-pass-1",
            "repeated_password": "integration-pass-1",
            "type": account_type,
        }))
        .send()
        .await
        .expect("registration request failed");

    assert_eq!(resp.status(), 201, "registration should return 201");
    let body: Value = resp.json().await.expect("registration body not JSON");

    TestAccount {
        user_id: body["user_id"].as_i64().expect("user_id missing"),
        username,
        token: body["token"].as_str().expect("token missing").to_string(),
    }
}

/// `Authorization` header value for an account.
#[must_use]
pub fn token_header(account: &TestAccount) -> String {
    format!("Token {}", account.token)
}

/// Create an offer with the given tier prices, returning the response body.
///
/// # Panics
///
/// Panics if the create request fails.
pub async fn create_offer(client: &Client, business: &TestAccount, prices: &[(&str, f64)]) -> Value {
    let details: Vec<Value> = prices
        .iter()
        .enumerate()
        .map(|(i, (tier, price))| {
            json!({
                "title": format!("{tier} tier"),
                "revisions": i + 1,
                "delivery_time_in_days": 3 * (i + 1),
                "price": price,
                "features": ["Feature A"],
                "offer_type": tier,
            })
        })
        .collect();

    let resp = client
        .post(format!("{}/offers/", base_url()))
        .header("Authorization", token_header(business))
        .json(&json!({
            "title": "Integration offer",
            "description": "Created by the integration suite",
            "details": details,
        }))
        .send()
        .await
        .expect("offer create request failed");

    assert_eq!(resp.status(), 201, "offer create should return 201");
    resp.json().await.expect("offer body not JSON")
}
