//! Repository layer for database operations

pub mod copies;
pub mod items;
pub mod rentals;
pub mod users;
pub mod wishlist;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, forms::CatalogLookup};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub items: items::ItemsRepository,
    pub copies: copies::CopiesRepository,
    pub rentals: rentals::RentalsRepository,
    pub users: users::UsersRepository,
    pub wishlist: wishlist::WishlistRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            items: items::ItemsRepository::new(pool.clone()),
            copies: copies::CopiesRepository::new(pool.clone()),
            rentals: rentals::RentalsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            wishlist: wishlist::WishlistRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl CatalogLookup for Repository {
    async fn book_title_exists(&self, title: &str, exclude: Option<i32>) -> AppResult<bool> {
        self.items.book_title_exists(title, exclude).await
    }

    async fn asset_code_exists(&self, asset_code: &str, exclude: Option<i32>) -> AppResult<bool> {
        self.copies.asset_code_exists(asset_code, exclude).await
    }

    async fn email_registered(&self, email: &str, exclude: Option<i32>) -> AppResult<bool> {
        self.users.email_exists(email, exclude).await
    }
}
