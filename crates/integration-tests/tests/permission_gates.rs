//! Status-code checks for the role and ownership gates.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p giglet-api)
//!
//! Run with: cargo test -p giglet-integration-tests -- --ignored

use reqwest::Client;
use serde_json::{Value, json};

use giglet_integration_tests::{base_url, create_offer, register_account, token_header};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_login_failure_returns_400() {
    let client = Client::new();

    let resp = client
        .post(format!("{}/login/", base_url()))
        .json(&json!({"username": "no_such_user", "password": "whatever-pass"}))
        .send()
        .await
        .expect("login request failed");

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_missing_token_returns_401() {
    let client = Client::new();

    let resp = client
        .get(format!("{}/orders/", base_url()))
        .send()
        .await
        .expect("orders request failed");

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_customer_cannot_create_offer() {
    let client = Client::new();
    let customer = register_account(&client, "customer").await;

    let resp = client
        .post(format!("{}/offers/", base_url()))
        .header("Authorization", token_header(&customer))
        .json(&json!({
            "title": "Forbidden offer",
            "details": [{
                "title": "Basic",
                "revisions": 1,
                "delivery_time_in_days": 3,
                "price": 50.0,
                "features": [],
                "offer_type": "basic",
            }],
        }))
        .send()
        .await
        .expect("offer create request failed");

    assert_eq!(resp.status(), 403);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_offer_without_details_returns_400() {
    let client = Client::new();
    let business = register_account(&client, "business").await;

    let resp = client
        .post(format!("{}/offers/", base_url()))
        .header("Authorization", token_header(&business))
        .json(&json!({"title": "Detail-less offer", "details": []}))
        .send()
        .await
        .expect("offer create request failed");

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("error body not JSON");
    assert!(body["details"].is_array(), "expected a per-field error map");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_business_cannot_place_order() {
    let client = Client::new();
    let seller = register_account(&client, "business").await;
    let other = register_account(&client, "business").await;

    let offer = create_offer(&client, &seller, &[("basic", 100.0)]).await;
    let detail_id = offer["details"][0]["id"]
        .as_i64()
        .expect("detail id missing");

    let resp = client
        .post(format!("{}/orders/", base_url()))
        .header("Authorization", token_header(&other))
        .json(&json!({"offer_detail_id": detail_id}))
        .send()
        .await
        .expect("order create request failed");

    assert_eq!(resp.status(), 403);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_customer_cannot_update_order_status() {
    let client = Client::new();
    let business = register_account(&client, "business").await;
    let customer = register_account(&client, "customer").await;

    let offer = create_offer(&client, &business, &[("basic", 100.0)]).await;
    let detail_id = offer["details"][0]["id"]
        .as_i64()
        .expect("detail id missing");

    let resp = client
        .post(format!("{}/orders/", base_url()))
        .header("Authorization", token_header(&customer))
        .json(&json!({"offer_detail_id": detail_id}))
        .send()
        .await
        .expect("order create failed");
    assert_eq!(resp.status(), 201);
    let order: Value = resp.json().await.expect("order body not JSON");
    let order_id = order["id"].as_i64().expect("order id missing");

    // The customer side may not complete their own order
    let resp = client
        .patch(format!("{}/orders/{order_id}/", base_url()))
        .header("Authorization", token_header(&customer))
        .json(&json!({"status": "completed"}))
        .send()
        .await
        .expect("status update request failed");
    assert_eq!(resp.status(), 403);

    // Neither participant may delete without the staff flag
    let resp = client
        .delete(format!("{}/orders/{order_id}/", base_url()))
        .header("Authorization", token_header(&customer))
        .send()
        .await
        .expect("delete request failed");
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_duplicate_review_returns_400() {
    let client = Client::new();
    let business = register_account(&client, "business").await;
    let customer = register_account(&client, "customer").await;

    let review = json!({
        "business_user": business.user_id,
        "rating": 4,
        "description": "first take",
    });

    let resp = client
        .post(format!("{}/reviews/", base_url()))
        .header("Authorization", token_header(&customer))
        .json(&review)
        .send()
        .await
        .expect("review create failed");
    assert_eq!(resp.status(), 201);

    let resp = client
        .post(format!("{}/reviews/", base_url()))
        .header("Authorization", token_header(&customer))
        .json(&review)
        .send()
        .await
        .expect("second review create failed");
    assert_eq!(resp.status(), 400, "duplicate pair must never insert");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_profile_patch_is_owner_only() {
    let client = Client::new();
    let owner = register_account(&client, "customer").await;
    let intruder = register_account(&client, "customer").await;

    let resp = client
        .patch(format!("{}/profile/{}/", base_url(), owner.user_id))
        .header("Authorization", token_header(&intruder))
        .json(&json!({"location": "Elsewhere"}))
        .send()
        .await
        .expect("profile patch request failed");
    assert_eq!(resp.status(), 403);

    let resp = client
        .patch(format!("{}/profile/{}/", base_url(), owner.user_id))
        .header("Authorization", token_header(&owner))
        .json(&json!({"location": "Hamburg"}))
        .send()
        .await
        .expect("profile patch request failed");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("profile body not JSON");
    assert_eq!(body["location"], "Hamburg");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_unknown_offer_is_404_before_ownership() {
    let client = Client::new();
    let business = register_account(&client, "business").await;

    let resp = client
        .patch(format!("{}/offers/999999999/", base_url()))
        .header("Authorization", token_header(&business))
        .json(&json!({"title": "nope"}))
        .send()
        .await
        .expect("offer patch request failed");

    assert_eq!(resp.status(), 404);
}
