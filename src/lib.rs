//! Library catalog server
//!
//! REST JSON API of an office library: a catalog of books and magazines,
//! their physical copies, reservations and borrows, a wishlist of titles to
//! buy, and accounts authenticated locally or against the corporate directory.

use std::sync::Arc;

use sqlx::PgPool;

pub mod api;
pub mod config;
pub mod directory;
pub mod error;
pub mod forms;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub pool: PgPool,
}
