//! API integration tests

use reqwest::Client;
use serde_json::{json, Value};
use tokio_test::assert_ok;

use chrono::Utc;

use crate::common::{
    admin_token, asset_code, book_payload, letters, login, magazine_payload, reader_token, repository, seed_book,
    seed_rental, seed_user, seed_wish, suffix, BASE_URL, PASSWORD,
};
use library_catalog::{error::AppError, models::RoleEnum};

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = assert_ok!(client.get(format!("{}/health", BASE_URL)).send().await);
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();
    let user = seed_user(RoleEnum::User).await;

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": user.email, "password": PASSWORD }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["email"], user.email.as_str());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();
    let user = seed_user(RoleEnum::User).await;

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": user.email, "password": "Wrong#pass1" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_me_requires_token() {
    let client = Client::new();

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_register_then_login() {
    let client = Client::new();
    let email = format!("new.reader.{}@tieto.com", suffix());

    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({
            "email": email,
            "first_name": "Piotr",
            "surname": "Zielinski",
            "password": PASSWORD,
            "confirm_pass": PASSWORD
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["redirect"], "/login");

    let token = login(&client, &email).await;
    assert!(!token.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_register_rejects_foreign_domain_and_weak_password() {
    let client = Client::new();

    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({
            "email": format!("someone.{}@example.com", suffix()),
            "first_name": "Piotr",
            "surname": "Zielinski",
            "password": "weak",
            "confirm_pass": "weak"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["fields"]["email"].is_array());
    assert!(body["fields"]["password"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_form_schema() {
    let client = Client::new();

    let response = client
        .get(format!("{}/forms/add_book", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/forms/no_such_form", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_create_book_requires_admin() {
    let client = Client::new();
    let token = reader_token(&client).await;

    let response = client
        .post(format!("{}/items/books", BASE_URL))
        .bearer_auth(&token)
        .json(&book_payload(&format!("Forbidden {}", letters(8))))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_create_book_and_search() {
    let client = Client::new();
    let token = admin_token(&client).await;
    let (id, title) = seed_book(&client, &token, 2).await;

    let response = client
        .get(format!("{}/items/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let item: Value = response.json().await.expect("Failed to parse item");
    assert_eq!(item["item_type"], "book");
    assert_eq!(item["book"]["authors"].as_array().map(Vec::len), Some(2));
    // duplicate tags collapse
    assert_eq!(item["tags"].as_array().map(Vec::len), Some(2));

    let response = client
        .get(format!("{}/items", BASE_URL))
        .query(&[("query", title.to_uppercase())])
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let page: Value = response.json().await.expect("Failed to parse page");
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["nb_copies"], 2);
    assert_eq!(page["items"][0]["nb_available"], 2);
}

#[tokio::test]
#[ignore]
async fn test_search_by_hyphenated_isbn() {
    let client = Client::new();
    let token = admin_token(&client).await;
    let (id, _) = seed_book(&client, &token, 1).await;

    let response = client
        .get(format!("{}/items", BASE_URL))
        .query(&[("query", "978-92-95055-02-5"), ("per_page", "100")])
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let page: Value = response.json().await.expect("Failed to parse page");
    let ids: Vec<i64> = page["items"]
        .as_array()
        .expect("items array")
        .iter()
        .filter_map(|item| item["id"].as_i64())
        .collect();
    assert!(ids.contains(&i64::from(id)));
}

#[tokio::test]
#[ignore]
async fn test_search_rejects_long_query_and_survives_huge_page() {
    let client = Client::new();

    let response = client
        .get(format!("{}/items", BASE_URL))
        .query(&[("query", "x".repeat(101))])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    let response = client
        .get(format!("{}/items", BASE_URL))
        .query(&[("page", i64::MAX.to_string()), ("per_page", "100".to_string())])
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let page: Value = response.json().await.expect("Failed to parse page");
    assert_eq!(page["items"].as_array().map(Vec::len), Some(0));
    assert_eq!(page["page"], i64::MAX);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_book_title_is_rejected() {
    let client = Client::new();
    let token = admin_token(&client).await;
    let (_, title) = seed_book(&client, &token, 0).await;

    let response = client
        .post(format!("{}/items/books", BASE_URL))
        .bearer_auth(&token)
        .json(&book_payload(&title.to_lowercase()))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["fields"]["title"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_create_and_update_magazine() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let response = client
        .post(format!("{}/items/magazines", BASE_URL))
        .bearer_auth(&token)
        .json(&magazine_payload(&format!("Programista {}", letters(6))))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let magazine: Value = response.json().await.expect("Failed to parse magazine");
    let id = magazine["id"].as_i64().expect("No magazine id");

    let mut update = magazine_payload(&format!("Programista {}", letters(6)));
    update["issue"] = json!("4/2016");
    let response = client
        .put(format!("{}/items/magazines/{}", BASE_URL, id))
        .bearer_auth(&token)
        .json(&update)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let magazine: Value = response.json().await.expect("Failed to parse magazine");
    assert_eq!(magazine["magazine"]["issue"], "4/2016");
}

#[tokio::test]
#[ignore]
async fn test_duplicate_asset_code_is_rejected() {
    let client = Client::new();
    let token = admin_token(&client).await;
    let (id, _) = seed_book(&client, &token, 0).await;
    let code = asset_code();

    for expected in [201, 422] {
        let response = client
            .post(format!("{}/items/{}/copies", BASE_URL, id))
            .bearer_auth(&token)
            .json(&json!({ "asset_code": code, "has_cd_disk": true, "shelf": "B2" }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), expected);
    }
}

#[tokio::test]
#[ignore]
async fn test_reservation_lifecycle() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let reader = reader_token(&client).await;
    let (id, _) = seed_book(&client, &admin, 1).await;

    let response = client
        .post(format!("{}/items/{}/reserve", BASE_URL, id))
        .bearer_auth(&reader)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let log: Value = response.json().await.expect("Failed to parse reservation");
    assert_eq!(log["book_status"], "reserved");
    let rental_id = log["id"].as_i64().expect("No reservation id");

    // the only copy is taken now
    let other = reader_token(&client).await;
    let response = client
        .post(format!("{}/items/{}/reserve", BASE_URL, id))
        .bearer_auth(&other)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    let response = client
        .post(format!("{}/reservations/{}/borrow", BASE_URL, rental_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let log: Value = response.json().await.expect("Failed to parse rental");
    assert_eq!(log["book_status"], "borrowed");
    assert!(log["borrow_time"].is_string());

    // a borrowed copy can no longer be cancelled by its reader
    let response = client
        .post(format!("{}/reservations/{}/cancel", BASE_URL, rental_id))
        .bearer_auth(&reader)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    let response = client
        .post(format!("{}/reservations/{}/return", BASE_URL, rental_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/reservations", BASE_URL))
        .query(&[("open", "false")])
        .bearer_auth(&reader)
        .send()
        .await
        .expect("Failed to send request");
    let rentals: Value = response.json().await.expect("Failed to parse rentals");
    assert_eq!(rentals[0]["book_status"], "returned");
}

#[tokio::test]
#[ignore]
async fn test_cancel_reservation_frees_copy() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let reader = reader_token(&client).await;
    let (id, _) = seed_book(&client, &admin, 1).await;

    let response = client
        .post(format!("{}/items/{}/reserve", BASE_URL, id))
        .bearer_auth(&reader)
        .send()
        .await
        .expect("Failed to send request");
    let log: Value = response.json().await.expect("Failed to parse reservation");

    let response = client
        .post(format!("{}/reservations/{}/cancel", BASE_URL, log["id"]))
        .bearer_auth(&reader)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/items/{}/copies", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    let copies: Value = response.json().await.expect("Failed to parse copies");
    assert_eq!(copies[0]["available_status"], "returned");
}

#[tokio::test]
#[ignore]
async fn test_delete_item_with_reserved_copy_conflicts() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let reader = reader_token(&client).await;
    let (id, _) = seed_book(&client, &admin, 1).await;

    client
        .post(format!("{}/items/{}/reserve", BASE_URL, id))
        .bearer_auth(&reader)
        .send()
        .await
        .expect("Failed to send request");

    let response = client
        .delete(format!("{}/items/{}", BASE_URL, id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_wishlist_like() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let reader = reader_token(&client).await;

    let response = client
        .post(format!("{}/wishlist", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({
            "authors": "Steve Klabnik, Carol Nichols",
            "title": format!("The Rust Programming Language {}", letters(5)),
            "pub_date": "2018",
            "type": "book"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let wish: Value = response.json().await.expect("Failed to parse wish");
    assert_eq!(wish["likes_count"], 0);

    let response = client
        .post(format!("{}/wishlist/{}/like", BASE_URL, wish["id"]))
        .bearer_auth(&reader)
        .send()
        .await
        .expect("Failed to send request");
    let wish: Value = response.json().await.expect("Failed to parse wish");
    assert_eq!(wish["likes_count"], 1);
}

#[tokio::test]
#[ignore]
async fn test_promote_unknown_employee() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let response = client
        .post(format!("{}/admin/promote", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({ "emails": [format!("ghost.{}@tieto.com", suffix())] }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let reports: Value = response.json().await.expect("Failed to parse reports");
    assert_eq!(reports[0]["status"], "not_in_directory");
}

#[tokio::test]
#[ignore]
async fn test_open_reservations_of_reader() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (id, title) = seed_book(&client, &admin, 2).await;
    let reader = seed_user(RoleEnum::User).await;
    let rental = seed_rental(id, reader.id).await;
    let token = login(&client, &reader.email).await;

    let response = client
        .get(format!("{}/reservations", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    let rentals: Value = response.json().await.expect("Failed to parse rentals");
    assert_eq!(rentals.as_array().map(Vec::len), Some(1));
    assert_eq!(rentals[0]["id"], rental.id);
    assert_eq!(rentals[0]["title"], title.as_str());

    // one open rental per item and reader
    let response = client
        .post(format!("{}/items/{}/reserve", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_expired_reservation_goes_back_on_shelf() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (id, _) = seed_book(&client, &admin, 1).await;
    let reader = seed_user(RoleEnum::User).await;
    let rental = seed_rental(id, reader.id).await;

    let repository = repository().await;
    sqlx::query("UPDATE rental_logs SET reservation_end = NOW() - INTERVAL '1 hour' WHERE id = $1")
        .bind(rental.id)
        .execute(&repository.pool)
        .await
        .expect("Failed to backdate reservation");

    let released = repository
        .rentals
        .release_expired(Utc::now())
        .await
        .expect("Failed to release reservations");
    assert!(released >= 1);

    let response = client
        .get(format!("{}/items/{}/copies", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    let copies: Value = response.json().await.expect("Failed to parse copies");
    assert_eq!(copies[0]["available_status"], "returned");

    let token = login(&client, &reader.email).await;
    let response = client
        .get(format!("{}/reservations", BASE_URL))
        .query(&[("open", "true")])
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    let open: Value = response.json().await.expect("Failed to parse rentals");
    assert_eq!(open.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore]
async fn test_concurrent_reserves_by_one_reader() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (id, _) = seed_book(&client, &admin, 3).await;
    let reader = seed_user(RoleEnum::User).await;
    let repository = repository().await;

    let (first, second) = tokio::join!(
        repository.rentals.reserve(id, reader.id),
        repository.rentals.reserve(id, reader.id)
    );

    let granted = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(granted, 1);
    assert!([first, second]
        .into_iter()
        .any(|r| matches!(r, Err(AppError::Conflict(_)))));
}

#[tokio::test]
#[ignore]
async fn test_wishlist_ordered_by_likes() {
    let client = Client::new();
    let reader = reader_token(&client).await;
    let first = seed_wish().await;
    let second = seed_wish().await;

    for _ in 0..2 {
        client
            .post(format!("{}/wishlist/{}/like", BASE_URL, second.id))
            .bearer_auth(&reader)
            .send()
            .await
            .expect("Failed to send request");
    }

    let response = client
        .get(format!("{}/wishlist", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    let wishes: Value = response.json().await.expect("Failed to parse wishlist");
    let ids: Vec<i64> = wishes
        .as_array()
        .expect("Wishlist is not an array")
        .iter()
        .filter_map(|w| w["id"].as_i64())
        .collect();
    let first_pos = ids.iter().position(|&id| id == first.id as i64).expect("First wish missing");
    let second_pos = ids.iter().position(|&id| id == second.id as i64).expect("Second wish missing");
    assert!(second_pos < first_pos);
}
