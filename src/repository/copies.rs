//! Copies repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::copy::{CopyDraft, ItemCopy},
};

const COPY_COLUMNS: &str = "id, asset_code, library_item_id, has_cd_disk, shelf, available_status";

fn duplicate_code(e: sqlx::Error, code: &str) -> AppError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            AppError::Conflict(format!("Copy with asset code {} already exists", code))
        }
        other => AppError::Database(other),
    }
}

#[derive(Clone)]
pub struct CopiesRepository {
    pool: Pool<Postgres>,
}

impl CopiesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list_for_item(&self, item_id: i32) -> AppResult<Vec<ItemCopy>> {
        let copies = sqlx::query_as::<_, ItemCopy>(&format!(
            "SELECT {} FROM copies WHERE library_item_id = $1 ORDER BY asset_code",
            COPY_COLUMNS
        ))
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(copies)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<ItemCopy> {
        sqlx::query_as::<_, ItemCopy>(&format!("SELECT {} FROM copies WHERE id = $1", COPY_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Copy with id {} not found", id)))
    }

    /// Whether a copy other than `exclude` carries this code (case-insensitive)
    pub async fn asset_code_exists(&self, asset_code: &str, exclude: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM copies WHERE LOWER(asset_code) = LOWER($1) AND ($2::int IS NULL OR id <> $2))",
        )
        .bind(asset_code.trim())
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn create(&self, item_id: i32, draft: &CopyDraft) -> AppResult<ItemCopy> {
        let item_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM library_items WHERE id = $1)")
            .bind(item_id)
            .fetch_one(&self.pool)
            .await?;
        if !item_exists {
            return Err(AppError::NotFound(format!("Item with id {} not found", item_id)));
        }

        let copy = sqlx::query_as::<_, ItemCopy>(&format!(
            r#"
            INSERT INTO copies (asset_code, library_item_id, has_cd_disk, shelf, available_status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            COPY_COLUMNS
        ))
        .bind(&draft.asset_code)
        .bind(item_id)
        .bind(draft.has_cd_disk)
        .bind(&draft.shelf)
        .bind(draft.available_status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| duplicate_code(e, &draft.asset_code))?;

        Ok(copy)
    }

    pub async fn update(&self, id: i32, draft: &CopyDraft) -> AppResult<ItemCopy> {
        sqlx::query_as::<_, ItemCopy>(&format!(
            r#"
            UPDATE copies SET asset_code = $1, has_cd_disk = $2, shelf = $3, available_status = $4
            WHERE id = $5
            RETURNING {}
            "#,
            COPY_COLUMNS
        ))
        .bind(&draft.asset_code)
        .bind(draft.has_cd_disk)
        .bind(&draft.shelf)
        .bind(draft.available_status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| duplicate_code(e, &draft.asset_code))?
        .ok_or_else(|| AppError::NotFound(format!("Copy with id {} not found", id)))
    }

    /// Delete a copy that is on the shelf
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let copy = self.get_by_id(id).await?;
        if !copy.available_status.is_available() {
            return Err(AppError::Conflict(format!(
                "Copy {} is {}",
                copy.asset_code,
                copy.available_status.as_str()
            )));
        }

        sqlx::query("DELETE FROM copies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
