//! Wishlist repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::wishlist::{WishDraft, WishListItem},
};

const WISH_COLUMNS: &str = "id, authors, title, pub_year, item_type, likes_count";

#[derive(Clone)]
pub struct WishlistRepository {
    pool: Pool<Postgres>,
}

impl WishlistRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Most liked first
    pub async fn list(&self) -> AppResult<Vec<WishListItem>> {
        let items = sqlx::query_as::<_, WishListItem>(&format!(
            "SELECT {} FROM wish_list_items ORDER BY likes_count DESC, id",
            WISH_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn create(&self, draft: &WishDraft) -> AppResult<WishListItem> {
        let item = sqlx::query_as::<_, WishListItem>(&format!(
            r#"
            INSERT INTO wish_list_items (authors, title, pub_year, item_type)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            WISH_COLUMNS
        ))
        .bind(&draft.authors)
        .bind(&draft.title)
        .bind(draft.pub_year)
        .bind(draft.item_type.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    pub async fn like(&self, id: i32) -> AppResult<WishListItem> {
        sqlx::query_as::<_, WishListItem>(&format!(
            "UPDATE wish_list_items SET likes_count = likes_count + 1 WHERE id = $1 RETURNING {}",
            WISH_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Wishlist item with id {} not found", id)))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM wish_list_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Wishlist item with id {} not found", id)));
        }

        Ok(())
    }
}
