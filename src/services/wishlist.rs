//! Wishlist service

use crate::{
    config::LibraryConfig,
    error::AppResult,
    forms::{FormRules, WishlistForm},
    models::WishListItem,
    repository::Repository,
};

#[derive(Clone)]
pub struct WishlistService {
    repository: Repository,
    library: LibraryConfig,
}

impl WishlistService {
    pub fn new(repository: Repository, library: LibraryConfig) -> Self {
        Self { repository, library }
    }

    pub async fn list(&self) -> AppResult<Vec<WishListItem>> {
        self.repository.wishlist.list().await
    }

    pub async fn add(&self, form: WishlistForm) -> AppResult<WishListItem> {
        form.validate_with(&FormRules::from_config(&self.library))?;
        self.repository.wishlist.create(&form.into_draft()?).await
    }

    pub async fn like(&self, id: i32) -> AppResult<WishListItem> {
        self.repository.wishlist.like(id).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.wishlist.delete(id).await
    }
}
