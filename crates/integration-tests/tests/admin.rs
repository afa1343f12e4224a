//! Admin API and pages.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database (`lunch-cli seed --reset`)
//! - The web server running (`cargo run -p lunch-order-web`)

use reqwest::StatusCode;
use serde_json::{Value, json};

use lunch_order_integration_tests::{admin_client, anonymous_client, base_url, fresh_user};

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_health_endpoints() {
    let client = anonymous_client().expect("Failed to create HTTP client");

    let resp = client
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{}/health/ready", base_url()))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_admin_pages_redirect_anonymous_users() {
    let client = anonymous_client().expect("Failed to create HTTP client");

    let resp = client
        .get(format!("{}/admin/today", base_url()))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers()
            .get("location")
            .and_then(|v| v.to_str().ok()),
        Some("/auth/login")
    );
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_non_admin_cannot_use_admin_api() {
    let admin = admin_client().await.expect("Admin login failed");
    let (client, _user) = fresh_user(&admin).await.expect("Failed to create user");

    let resp = client
        .get(format!("{}/api/admin/users", base_url()))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_duplicate_email_conflicts() {
    let admin = admin_client().await.expect("Admin login failed");
    let (_client, user) = fresh_user(&admin).await.expect("Failed to create user");

    let resp = admin
        .post(format!("{}/api/admin/users", base_url()))
        .json(&json!({
            "username": "again",
            "email": user["email"],
            "password": "integration-pass",
        }))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.expect("Error body is not JSON");
    assert_eq!(body["error"], "A user with this email already exists");
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_delete_user() {
    let admin = admin_client().await.expect("Admin login failed");
    let (_client, user) = fresh_user(&admin).await.expect("Failed to create user");

    let resp = admin
        .delete(format!("{}/api/admin/users", base_url()))
        .json(&json!({ "id": user["id"] }))
        .send()
        .await
        .expect("Request failed");
    assert!(resp.status().is_success());

    let resp = admin
        .delete(format!("{}/api/admin/users", base_url()))
        .json(&json!({ "id": user["id"] }))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_report_csv() {
    let admin = admin_client().await.expect("Admin login failed");

    let resp = admin
        .get(format!(
            "{}/api/admin/report?from=2025-06-02&to=2025-06-06",
            base_url()
        ))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("text/csv")
    );
    let body = resp.text().await.expect("Failed to read CSV");
    assert!(body.starts_with("date,user,email,lunch,price\n"));
}
