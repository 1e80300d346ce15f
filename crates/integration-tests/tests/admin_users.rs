//! Integration tests for account management.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The admin server running (cargo run -p pet-haven-admin)
//! - An approved admin created via:
//!   `ph-cli admin create -e it-admin@example.com -n "IT Admin" -p <password>`
//!   with the password exported as `IT_ADMIN_PASSWORD`
//!
//! Run with: cargo test -p pet-haven-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

use pet_haven_integration_tests::{admin_base_url, client_with_cookies};

const IT_ADMIN_EMAIL: &str = "it-admin@example.com";

/// Log in as the pre-provisioned integration-test admin.
async fn login_admin(client: &Client) -> Value {
    let base_url = admin_base_url();
    let password =
        std::env::var("IT_ADMIN_PASSWORD").expect("IT_ADMIN_PASSWORD must be set for these tests");

    let resp = client
        .post(format!("{base_url}/auth/login"))
        .json(&json!({ "email": IT_ADMIN_EMAIL, "password": password }))
        .send()
        .await
        .expect("Failed to log in");

    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("Failed to read login response")
}

#[tokio::test]
#[ignore = "Requires running admin server, database, and provisioned admin"]
async fn test_delete_user_requires_authentication() {
    let client = client_with_cookies();
    let base_url = admin_base_url();

    let resp = client
        .delete(format!("{base_url}/users/{}", Uuid::new_v4()))
        .send()
        .await
        .expect("Failed to send delete");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin server, database, and provisioned admin"]
async fn test_delete_unknown_user_is_404() {
    let client = client_with_cookies();
    let base_url = admin_base_url();
    login_admin(&client).await;

    let resp = client
        .delete(format!("{base_url}/users/{}", Uuid::new_v4()))
        .send()
        .await
        .expect("Failed to send delete");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("Failed to read response");
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "Requires running admin server, database, and provisioned admin"]
async fn test_self_deletion_rejected() {
    let client = client_with_cookies();
    let base_url = admin_base_url();
    let login = login_admin(&client).await;
    let own_id = login["profile"]["id"].as_str().expect("profile id").to_owned();

    let resp = client
        .delete(format!("{base_url}/users/{own_id}"))
        .send()
        .await
        .expect("Failed to send delete");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to read response");
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "Requires running admin server, database, and provisioned admin"]
async fn test_approve_then_delete_roundtrip() {
    let client = client_with_cookies();
    let base_url = admin_base_url();
    login_admin(&client).await;

    // Create a pending signup through the public endpoint.
    let victim_email = format!("it-{}@example.com", Uuid::new_v4().simple());
    let resp = client
        .post(format!("{base_url}/auth/signup"))
        .json(&json!({
            "email": victim_email,
            "name": "Pending",
            "password": "a-strong-enough-password",
        }))
        .send()
        .await
        .expect("Failed to sign up");
    assert!(resp.status().is_success());

    // Find it in the account list.
    let resp = client
        .get(format!("{base_url}/users"))
        .send()
        .await
        .expect("Failed to list users");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to read response");
    let target_id = body["users"]
        .as_array()
        .expect("users array")
        .iter()
        .find(|user| user["email"] == victim_email.as_str())
        .and_then(|user| user["id"].as_str())
        .expect("new signup present in list")
        .to_owned();

    // Approve, then delete, then confirm the success body shape.
    let resp = client
        .post(format!("{base_url}/users/{target_id}/approve"))
        .send()
        .await
        .expect("Failed to approve");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .delete(format!("{base_url}/users/{target_id}"))
        .send()
        .await
        .expect("Failed to delete");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to read response");
    assert_eq!(body["success"], true);
}
