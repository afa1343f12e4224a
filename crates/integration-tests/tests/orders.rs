//! Ordering through the JSON API.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database (`lunch-cli seed --reset`)
//! - The web server running (`cargo run -p lunch-order-web`)

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use lunch_order_integration_tests::{
    admin_client, anonymous_client, base_url, fresh_user, next_saturday, open_date,
};

async fn lunch_type_id(client: &Client, name: &str) -> Value {
    let types: Vec<Value> = client
        .get(format!("{}/api/lunch-types", base_url()))
        .send()
        .await
        .expect("Failed to list lunch types")
        .json()
        .await
        .expect("Lunch types are not JSON");

    types
        .into_iter()
        .find(|t| t["name"] == name)
        .map(|t| t["id"].clone())
        .unwrap_or_else(|| panic!("lunch type {name} not seeded"))
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_orders_require_login() {
    let client = anonymous_client().expect("Failed to create HTTP client");

    let resp = client
        .get(format!("{}/api/orders", base_url()))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.expect("Error body is not JSON");
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_place_edit_and_list_order() {
    let admin = admin_client().await.expect("Admin login failed");
    let (client, _user) = fresh_user(&admin).await.expect("Failed to create user");
    let salad = lunch_type_id(&client, "Salad").await;
    let date = open_date().format("%Y-%m-%d").to_string();

    let resp = client
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({ "lunchTypeId": salad, "date": date, "drinkType": "Ayran" }))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.expect("Order is not JSON");

    // A second order on the same day is refused.
    let resp = client
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({ "lunchTypeId": salad, "date": date }))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Error body is not JSON");
    assert_eq!(body["error"], "Order already exists for this day");

    let resp = client
        .put(format!("{}/api/orders", base_url()))
        .json(&json!({
            "id": order["id"],
            "lunchTypeId": salad,
            "date": date,
            "customization": "no dressing",
        }))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let weeks: Value = client
        .get(format!("{}/api/orders", base_url()))
        .send()
        .await
        .expect("Request failed")
        .json()
        .await
        .expect("Orders are not JSON");
    let listed = weeks
        .as_object()
        .expect("Orders should be grouped by week")
        .values()
        .flat_map(|w| w.as_array().cloned().unwrap_or_default())
        .find(|o| o["id"] == order["id"])
        .expect("New order missing from list");
    assert_eq!(listed["customization"], "no dressing");
    assert_eq!(listed["canChange"], true);
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_cold_requires_sandwich() {
    let admin = admin_client().await.expect("Admin login failed");
    let (client, _user) = fresh_user(&admin).await.expect("Failed to create user");
    let cold = lunch_type_id(&client, "Cold").await;

    let resp = client
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({ "lunchTypeId": cold, "date": open_date() }))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_weekend_orders_are_refused() {
    let admin = admin_client().await.expect("Admin login failed");
    let (client, _user) = fresh_user(&admin).await.expect("Failed to create user");
    let salad = lunch_type_id(&client, "Salad").await;

    let resp = client
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({ "lunchTypeId": salad, "date": next_saturday() }))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Error body is not JSON");
    assert_eq!(body["error"], "Cannot order on weekends");
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_guest_order_uses_guest_price() {
    let admin = admin_client().await.expect("Admin login failed");
    let salad = lunch_type_id(&admin, "Salad").await;

    let resp = admin
        .post(format!("{}/api/guest-orders", base_url()))
        .json(&json!({ "guestName": "Visitor", "lunchTypeId": salad, "date": open_date() }))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.expect("Guest order is not JSON");
    assert_eq!(order["guestName"], "Visitor");
}
