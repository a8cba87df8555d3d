//! API integration tests
//!
//! These run against a live server started with a freshly migrated
//! database and the bootstrapped admin account
//! (admin@example.com / adminpassword).

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to obtain an access token for the given credentials
async fn get_access_token(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/token", BASE_URL))
        .json(&json!({
            "email": email,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send token request");

    let body: Value = response.json().await.expect("Failed to parse token response");
    body["access_token"]
        .as_str()
        .expect("No access token in response")
        .to_string()
}

/// Helper to register a throwaway member account, returning its email
async fn register_member(client: &Client, name: &str) -> String {
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    let email = format!("{}+{}@example.com", name, nonce);

    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({
            "name": name,
            "email": email,
            "password": "pw123456"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), 201);
    email
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_and_token() {
    let client = Client::new();
    let email = register_member(&client, "alice").await;

    let response = client
        .post(format!("{}/token", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "pw123456"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["access_token"].is_string());
    assert!(body["refresh_token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
#[ignore]
async fn test_register_without_password() {
    let client = Client::new();

    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({
            "name": "nopass",
            "email": "nopass@example.com"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["fields"]["password"], "This field is required.");
}

#[tokio::test]
#[ignore]
async fn test_token_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/token", BASE_URL))
        .json(&json!({
            "email": "admin@example.com",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_refresh_token_flow() {
    let client = Client::new();

    let response = client
        .post(format!("{}/token", BASE_URL))
        .json(&json!({
            "email": "admin@example.com",
            "password": "adminpassword"
        }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let refresh = body["refresh_token"].as_str().expect("No refresh token");

    let response = client
        .post(format!("{}/token/refresh", BASE_URL))
        .json(&json!({ "refresh_token": refresh }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["access_token"].is_string());

    // An access token must not be accepted as a refresh token
    let access = body["access_token"].as_str().expect("No access token");
    let response = client
        .post(format!("{}/token/refresh", BASE_URL))
        .json(&json!({ "refresh_token": access }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthenticated_borrow() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books/1/borrow", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_list_books_open_and_filtered() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books?ordering=-published_at&author=ar", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
    assert!(body["total"].is_number());

    // Unknown ordering keys are rejected
    let response = client
        .get(format!("{}/books?ordering=isbn", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_borrow_return_cycle() {
    let client = Client::new();
    let admin_token = get_access_token(&client, "admin@example.com", "adminpassword").await;

    // Admin creates genre and book
    let response = client
        .post(format!("{}/genres", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({ "name": "Sci-Fi" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let genre: Value = response.json().await.expect("Failed to parse response");

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({
            "title": "Dune",
            "author": "Frank Herbert",
            "genre_id": genre["id"]
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let book: Value = response.json().await.expect("Failed to parse response");
    let book_id = book["id"].as_i64().expect("No book ID");
    assert_eq!(book["is_borrowed"], false);

    // Alice borrows
    let alice_email = register_member(&client, "alice").await;
    let alice_token = get_access_token(&client, &alice_email, "pw123456").await;

    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", alice_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["detail"], "The book was successfully taken");

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["is_borrowed"], true);

    // Bob cannot borrow the same book
    let bob_email = register_member(&client, "bob").await;
    let bob_token = get_access_token(&client, &bob_email, "pw123456").await;

    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", bob_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["detail"], "The book has already been taken");

    // Bob cannot return it either
    let response = client
        .post(format!("{}/books/{}/return", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", bob_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["detail"], "You didn't take this book");

    // Alice sees the book among her active borrows
    let response = client
        .get(format!("{}/users/borrowed", BASE_URL))
        .header("Authorization", format!("Bearer {}", alice_token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body
        .as_array()
        .expect("expected array")
        .iter()
        .any(|b| b["id"].as_i64() == Some(book_id)));

    // Alice returns
    let response = client
        .post(format!("{}/books/{}/return", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", alice_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["detail"], "Book successfully returned");

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["is_borrowed"], false);

    // Her history now shows one closed record for the book
    let response = client
        .get(format!("{}/users/my-history", BASE_URL))
        .header("Authorization", format!("Bearer {}", alice_token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let records = body.as_array().expect("expected array");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["book"]["id"].as_i64(), Some(book_id));
    assert!(records[0]["returned_at"].is_string());

    // Returning again is an error, the closed record is immutable
    let response = client
        .post(format!("{}/books/{}/return", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", alice_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_borrow_single_winner() {
    let client = Client::new();
    let admin_token = get_access_token(&client, "admin@example.com", "adminpassword").await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({
            "title": "Contended",
            "author": "Race Condition"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let book: Value = response.json().await.expect("Failed to parse response");
    let book_id = book["id"].as_i64().expect("No book ID");

    let u1_email = register_member(&client, "racer1").await;
    let u2_email = register_member(&client, "racer2").await;
    let t1 = get_access_token(&client, &u1_email, "pw123456").await;
    let t2 = get_access_token(&client, &u2_email, "pw123456").await;

    let req1 = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", t1))
        .send();
    let req2 = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", t2))
        .send();

    let (r1, r2) = tokio::join!(req1, req2);
    let s1 = r1.expect("Failed to send request").status();
    let s2 = r2.expect("Failed to send request").status();

    // Exactly one caller wins, the other observes the conflict
    let statuses = [s1.as_u16(), s2.as_u16()];
    assert!(statuses.contains(&200), "statuses: {:?}", statuses);
    assert!(statuses.contains(&400), "statuses: {:?}", statuses);
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_read_other_history() {
    let client = Client::new();

    let alice_email = register_member(&client, "alice").await;
    let alice_token = get_access_token(&client, &alice_email, "pw123456").await;

    // Admin user id 1 exists from bootstrap; a member may not read it
    let response = client
        .get(format!("{}/users/1/history", BASE_URL))
        .header("Authorization", format!("Bearer {}", alice_token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_create_book() {
    let client = Client::new();

    let email = register_member(&client, "carol").await;
    let token = get_access_token(&client, &email, "pw123456").await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Forbidden",
            "author": "Nobody"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_email_rejected() {
    let client = Client::new();
    let email = register_member(&client, "dave").await;

    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({
            "name": "Dave Again",
            "email": email,
            "password": "pw123456"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["fields"]["email"], "A user with this email already exists.");
}
