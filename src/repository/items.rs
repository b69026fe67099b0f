//! Library items repository for database operations.
//!
//! Search input is normalized (Unicode NFC, lower case, collapsed whitespace)
//! and matched against lower-cased columns; titles are stored NFC-normalized.
//! An input shaped like an ISBN also matches the stored ISBN without
//! separators. Authors and tags are shared rows, upserted by name when an item
//! is written.

use sqlx::{Pool, Postgres, Transaction};
use unicode_normalization::UnicodeNormalization;

use crate::{
    error::{AppError, AppResult},
    forms::validators::normalize_isbn,
    models::item::{Author, ItemDraft, ItemQuery, ItemRow, ItemShort, ItemType, LibraryItem, Tag},
};

const ITEM_COLUMNS: &str = r#"
    id, item_type, title, table_of_contents, language, category, description,
    isbn, original_title, publisher, pub_date, year, issue, created_at
"#;

/// Normalize user search input; `None` when nothing is left to search for
pub fn normalize_query(input: &str) -> Option<String> {
    let normalized = input
        .nfc()
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Stored form of an ISBN typed with separators, e.g. `978-0-13-235088-4`
fn isbn_candidate(input: &str) -> Option<String> {
    let looks_like_isbn = input
        .trim()
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '-' | ' ' | 'x' | 'X'));
    let isbn = normalize_isbn(input);
    if looks_like_isbn && isbn.chars().filter(char::is_ascii_digit).count() >= 4 {
        Some(isbn)
    } else {
        None
    }
}

/// `%term%` with LIKE wildcards escaped
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Split the free-text tag field into distinct tag names
pub fn tag_names(tag: Option<&str>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in tag.unwrap_or_default().split(',').map(str::trim) {
        if !name.is_empty() && !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            names.push(name.to_string());
        }
    }
    names
}

#[derive(Clone)]
pub struct ItemsRepository {
    pool: Pool<Postgres>,
}

impl ItemsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Search items, returning one page and the total match count
    pub async fn search(&self, query: &ItemQuery) -> AppResult<(Vec<ItemShort>, i64)> {
        let per_page = query.per_page();
        let offset = query.offset();

        let pattern = query
            .query
            .as_deref()
            .and_then(normalize_query)
            .map(|q| like_pattern(&q));
        let isbn_pattern = query
            .query
            .as_deref()
            .and_then(isbn_candidate)
            .map(|isbn| like_pattern(&isbn));
        let item_type = query.item_type.map(|t| t.as_str());

        let filter = r#"
            WHERE ($1::text IS NULL
                OR LOWER(i.title) LIKE $1 ESCAPE '\'
                OR LOWER(COALESCE(i.isbn, '')) LIKE $1 ESCAPE '\'
                OR ($3::text IS NOT NULL AND UPPER(COALESCE(i.isbn, '')) LIKE $3 ESCAPE '\')
                OR EXISTS (
                    SELECT 1 FROM item_authors ia JOIN authors a ON a.id = ia.author_id
                    WHERE ia.item_id = i.id
                      AND LOWER(a.first_name || ' ' || a.last_name) LIKE $1 ESCAPE '\')
                OR EXISTS (
                    SELECT 1 FROM item_tags it JOIN tags t ON t.id = it.tag_id
                    WHERE it.item_id = i.id AND LOWER(t.name) LIKE $1 ESCAPE '\'))
              AND ($2::text IS NULL OR i.item_type = $2)
        "#;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM library_items i {}", filter))
            .bind(&pattern)
            .bind(item_type)
            .bind(&isbn_pattern)
            .fetch_one(&self.pool)
            .await?;

        let select = format!(
            r#"
            SELECT i.id, i.item_type, i.title,
                (SELECT STRING_AGG(a.first_name || ' ' || a.last_name, ', ' ORDER BY ia.position)
                   FROM item_authors ia JOIN authors a ON a.id = ia.author_id
                  WHERE ia.item_id = i.id) AS authors,
                (SELECT COUNT(*) FROM copies c WHERE c.library_item_id = i.id) AS nb_copies,
                (SELECT COUNT(*) FROM copies c
                  WHERE c.library_item_id = i.id AND c.available_status = 'returned') AS nb_available
            FROM library_items i
            {}
            ORDER BY LOWER(i.title), i.id
            LIMIT $4 OFFSET $5
            "#,
            filter
        );

        let items = sqlx::query_as::<_, ItemShort>(&select)
            .bind(&pattern)
            .bind(item_type)
            .bind(&isbn_pattern)
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((items, total))
    }

    /// Get an item with its authors and tags
    pub async fn get_by_id(&self, id: i32) -> AppResult<LibraryItem> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {} FROM library_items WHERE id = $1",
            ITEM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))?;

        let authors = sqlx::query_as::<_, Author>(
            r#"
            SELECT a.id, a.first_name, a.last_name
            FROM item_authors ia JOIN authors a ON a.id = ia.author_id
            WHERE ia.item_id = $1
            ORDER BY ia.position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.name
            FROM item_tags it JOIN tags t ON t.id = it.tag_id
            WHERE it.item_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(row.into_item(authors, tags))
    }

    /// Whether a book titled `title` exists, ignoring item `exclude`
    pub async fn book_title_exists(&self, title: &str, exclude: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM library_items
                WHERE item_type = 'book' AND LOWER(title) = LOWER($1)
                  AND ($2::int IS NULL OR id <> $2))
            "#,
        )
        .bind(title.trim())
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    pub async fn create(&self, draft: &ItemDraft) -> AppResult<LibraryItem> {
        let mut tx = self.pool.begin().await?;
        let (pub_date, year) = Self::dates(draft);

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO library_items (
                item_type, title, table_of_contents, language, category, description,
                isbn, original_title, publisher, pub_date, year, issue
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(draft.item_type.as_str())
        .bind(&draft.title)
        .bind(&draft.table_of_contents)
        .bind(draft.language.as_str())
        .bind(draft.category.as_str())
        .bind(&draft.description)
        .bind(&draft.isbn)
        .bind(&draft.original_title)
        .bind(&draft.publisher)
        .bind(pub_date)
        .bind(year)
        .bind(&draft.issue)
        .fetch_one(&mut *tx)
        .await?;

        Self::write_relations(&mut tx, id, draft).await?;
        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Overwrite an item of the same type
    pub async fn update(&self, id: i32, draft: &ItemDraft) -> AppResult<LibraryItem> {
        let mut tx = self.pool.begin().await?;
        let (pub_date, year) = Self::dates(draft);

        let result = sqlx::query(
            r#"
            UPDATE library_items SET
                title = $1, table_of_contents = $2, language = $3, category = $4,
                description = $5, isbn = $6, original_title = $7, publisher = $8,
                pub_date = $9, year = $10, issue = $11
            WHERE id = $12 AND item_type = $13
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.table_of_contents)
        .bind(draft.language.as_str())
        .bind(draft.category.as_str())
        .bind(&draft.description)
        .bind(&draft.isbn)
        .bind(&draft.original_title)
        .bind(&draft.publisher)
        .bind(pub_date)
        .bind(year)
        .bind(&draft.issue)
        .bind(id)
        .bind(draft.item_type.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "{} with id {} not found",
                draft.item_type.label(),
                id
            )));
        }

        sqlx::query("DELETE FROM item_authors WHERE item_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM item_tags WHERE item_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        Self::write_relations(&mut tx, id, draft).await?;
        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Delete an item and its copies; refused while a copy is out
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let open: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM copies
            WHERE library_item_id = $1 AND available_status <> 'returned'
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if open > 0 {
            return Err(AppError::Conflict(format!(
                "Item {} has {} reserved or borrowed copies",
                id, open
            )));
        }

        let result = sqlx::query("DELETE FROM library_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Item with id {} not found", id)));
        }

        Ok(())
    }

    /// Books keep `pub_date`, magazines keep `year`
    fn dates(draft: &ItemDraft) -> (Option<chrono::NaiveDate>, Option<chrono::NaiveDate>) {
        match draft.item_type {
            ItemType::Book => (Some(draft.published), None),
            ItemType::Magazine => (None, Some(draft.published)),
        }
    }

    async fn write_relations(
        tx: &mut Transaction<'_, Postgres>,
        item_id: i32,
        draft: &ItemDraft,
    ) -> AppResult<()> {
        for (position, author) in draft.authors.iter().enumerate() {
            let author_id: i32 = sqlx::query_scalar(
                r#"
                INSERT INTO authors (first_name, last_name) VALUES ($1, $2)
                ON CONFLICT (first_name, last_name) DO UPDATE SET first_name = EXCLUDED.first_name
                RETURNING id
                "#,
            )
            .bind(&author.first_name)
            .bind(&author.last_name)
            .fetch_one(&mut **tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO item_authors (item_id, author_id, position) VALUES ($1, $2, $3)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(item_id)
            .bind(author_id)
            .bind(position as i16)
            .execute(&mut **tx)
            .await?;
        }

        for name in tag_names(draft.tag.as_deref()) {
            let tag_id: i32 = sqlx::query_scalar(
                r#"
                INSERT INTO tags (name) VALUES ($1)
                ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                RETURNING id
                "#,
            )
            .bind(&name)
            .fetch_one(&mut **tx)
            .await?;

            sqlx::query("INSERT INTO item_tags (item_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
                .bind(item_id)
                .bind(tag_id)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }
}
