//! Fixtures shared by the API tests

use chrono::NaiveDate;
use rand::Rng;
use reqwest::Client;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;

use library_catalog::{
    config::AppConfig,
    models::{user::NewUser, wishlist::WishDraft, ItemType, RentalLog, RoleEnum, User, WishListItem},
    repository::Repository,
    services::users::hash_password,
};

pub const BASE_URL: &str = "http://localhost:8080/api/v1";

pub const PASSWORD: &str = "Library#2018";

/// Valid ISBN-13 shared by the generated books
pub const ISBN: &str = "9789295055025";

/// Random digits keeping generated titles, mails and asset codes unique
pub fn suffix() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

/// Letters only, for fields that reject digits
pub fn letters(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
}

pub async fn repository() -> Repository {
    let config = AppConfig::load().expect("Failed to load configuration");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");
    Repository::new(pool)
}

/// Store an active local account with the given role
pub async fn seed_user(role: RoleEnum) -> User {
    let repository = repository().await;
    let user = NewUser {
        email: format!("reader.{}@tieto.com", suffix()),
        first_name: "Anna".to_string(),
        surname: "Nowak".to_string(),
        employee_id: None,
        password_hash: Some(hash_password(PASSWORD).expect("Failed to hash password")),
        active: true,
    };
    repository
        .users
        .create(&user, role)
        .await
        .expect("Failed to create user")
}

pub async fn login(client: &Client, email: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": PASSWORD }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

pub async fn admin_token(client: &Client) -> String {
    let admin = seed_user(RoleEnum::Admin).await;
    login(client, &admin.email).await
}

pub async fn reader_token(client: &Client) -> String {
    let reader = seed_user(RoleEnum::User).await;
    login(client, &reader.email).await
}

pub fn book_payload(title: &str) -> Value {
    json!({
        "radio": "book",
        "title": title,
        "isbn": ISBN,
        "publisher": "Helion",
        "first_name": "Jan",
        "surname": "Kowalski",
        "first_name_1": "Ewa",
        "surname_1": "Lis",
        "language": "polish",
        "category": "developers",
        "tag": "rust, Systems, rust",
        "description": "Ownership and borrowing explained",
        "pub_date": "2015"
    })
}

pub fn magazine_payload(title: &str) -> Value {
    json!({
        "radio": "magazine",
        "title_of_magazine": title,
        "issue": "3/2016",
        "language": "english",
        "category": "magazines",
        "pub_date": "2016"
    })
}

pub fn asset_code() -> String {
    format!("{}{}", letters(2), suffix())
}

/// Create a book with `copies` copies and return its id
pub async fn seed_book(client: &Client, token: &str, copies: usize) -> (i32, String) {
    let title = format!("Rust in practice {}", letters(8));
    let response = client
        .post(format!("{}/items/books", BASE_URL))
        .bearer_auth(token)
        .json(&book_payload(&title))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse book");
    let id = body["id"].as_i64().expect("No book id") as i32;

    for _ in 0..copies {
        let response = client
            .post(format!("{}/items/{}/copies", BASE_URL, id))
            .bearer_auth(token)
            .json(&json!({ "asset_code": asset_code(), "has_cd_disk": false, "shelf": "A1" }))
            .send()
            .await
            .expect("Failed to add copy");
        assert_eq!(response.status(), 201);
    }

    (id, title)
}

/// Store a wishlist item proposed by nobody in particular
pub async fn seed_wish() -> WishListItem {
    let repository = repository().await;
    let draft = WishDraft {
        authors: "Jim Blandy, Jason Orendorff".to_string(),
        title: format!("Programming Rust {}", letters(8)),
        pub_year: NaiveDate::from_ymd_opt(rand::thread_rng().gen_range(1970..=2018), 1, 1)
            .expect("valid year"),
        item_type: ItemType::Book,
    };
    repository.wishlist.create(&draft).await.expect("Failed to create wish")
}

/// Reserve a copy of `item_id` for `user_id` without going through the API
pub async fn seed_rental(item_id: i32, user_id: i32) -> RentalLog {
    let repository = repository().await;
    repository
        .rentals
        .reserve(item_id, user_id)
        .await
        .expect("Failed to reserve copy")
}
