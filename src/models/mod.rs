//! Data models for the library catalog

pub mod copy;
pub mod item;
pub mod rental;
pub mod user;
pub mod wishlist;

use thiserror::Error;

// Re-export commonly used types
pub use copy::{BookStatus, ItemCopy};
pub use item::{Author, Category, ItemShort, ItemType, Language, LibraryItem, Tag};
pub use rental::{RentalAction, RentalLog, ReservationDetails};
pub use user::{RoleEnum, User};
pub use wishlist::WishListItem;

/// Stored or submitted text that names no known variant
#[derive(Debug, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
