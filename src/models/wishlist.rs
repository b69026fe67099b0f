//! Wishlist items proposed for purchase

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::item::ItemType;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct WishListItem {
    pub id: i32,
    pub authors: String,
    pub title: String,
    pub pub_year: Option<NaiveDate>,
    #[sqlx(try_from = "String")]
    pub item_type: ItemType,
    pub likes_count: i32,
}

/// Validated wishlist entry
#[derive(Debug, Clone)]
pub struct WishDraft {
    pub authors: String,
    pub title: String,
    pub pub_year: NaiveDate,
    pub item_type: ItemType,
}
