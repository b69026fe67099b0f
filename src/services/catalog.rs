//! Catalog management service: items and their copies

use crate::{
    config::LibraryConfig,
    error::AppResult,
    forms::{
        AddNewItemBookForm, AddNewItemMagazineForm, BookForm, CopyAddForm, CopyEditForm, FormRules, MagazineForm,
        SearchForm,
    },
    models::{
        item::{ItemQuery, ItemShort, LibraryItem},
        ItemCopy,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    library: LibraryConfig,
}

impl CatalogService {
    pub fn new(repository: Repository, library: LibraryConfig) -> Self {
        Self { repository, library }
    }

    fn rules(&self) -> FormRules {
        FormRules::from_config(&self.library)
    }

    /// Search items with filters
    pub async fn search_items(&self, query: &ItemQuery) -> AppResult<(Vec<ItemShort>, i64)> {
        SearchForm::check_item_query(query)?;
        self.repository.items.search(query).await
    }

    /// Get item by ID with full details
    pub async fn get_item(&self, id: i32) -> AppResult<LibraryItem> {
        self.repository.items.get_by_id(id).await
    }

    pub async fn create_book(&self, form: AddNewItemBookForm) -> AppResult<LibraryItem> {
        form.validate_with(&self.repository, &self.rules()).await?;
        let item = self.repository.items.create(&form.book.into_draft()?).await?;
        tracing::info!("Created book {} ({})", item.id, item.title);
        Ok(item)
    }

    pub async fn create_magazine(&self, form: AddNewItemMagazineForm) -> AppResult<LibraryItem> {
        form.magazine.validate_with(&self.rules())?;
        let item = self.repository.items.create(&form.magazine.into_draft()?).await?;
        tracing::info!("Created magazine {} ({})", item.id, item.title);
        Ok(item)
    }

    pub async fn update_book(&self, id: i32, form: BookForm) -> AppResult<LibraryItem> {
        form.validate_with(&self.repository, &self.rules(), Some(id)).await?;
        self.repository.items.update(id, &form.into_draft()?).await
    }

    pub async fn update_magazine(&self, id: i32, form: MagazineForm) -> AppResult<LibraryItem> {
        form.validate_with(&self.rules())?;
        self.repository.items.update(id, &form.into_draft()?).await
    }

    pub async fn delete_item(&self, id: i32) -> AppResult<()> {
        self.repository.items.delete(id).await?;
        tracing::info!("Deleted item {}", id);
        Ok(())
    }

    // =========================================================================
    // Copies
    // =========================================================================

    pub async fn list_copies(&self, item_id: i32) -> AppResult<Vec<ItemCopy>> {
        // Surface a missing item as 404 rather than an empty list
        self.repository.items.get_by_id(item_id).await?;
        self.repository.copies.list_for_item(item_id).await
    }

    pub async fn add_copy(&self, item_id: i32, form: CopyAddForm) -> AppResult<ItemCopy> {
        form.validate_with(&self.repository).await?;
        let copy = self.repository.copies.create(item_id, &form.into_draft()).await?;
        tracing::info!("Added copy {} to item {}", copy.asset_code, item_id);
        Ok(copy)
    }

    pub async fn edit_copy(&self, copy_id: i32, form: CopyEditForm) -> AppResult<ItemCopy> {
        form.validate_with(&self.repository, copy_id).await?;
        self.repository.copies.update(copy_id, &form.into_draft()?).await
    }

    pub async fn delete_copy(&self, copy_id: i32) -> AppResult<()> {
        self.repository.copies.delete(copy_id).await
    }
}
