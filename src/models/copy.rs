//! Copy (physical exemplar) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::UnknownVariant;

/// Circulation status of a copy, also recorded on each rental log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    Returned,
    Reserved,
    Borrowed,
}

impl BookStatus {
    pub const ALL: [BookStatus; 3] = [BookStatus::Returned, BookStatus::Reserved, BookStatus::Borrowed];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Returned => "returned",
            BookStatus::Reserved => "reserved",
            BookStatus::Borrowed => "borrowed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BookStatus::Returned => "Returned",
            BookStatus::Reserved => "Reserved",
            BookStatus::Borrowed => "Borrowed",
        }
    }

    /// A copy can be reserved only when it is on the shelf
    pub fn is_available(&self) -> bool {
        *self == BookStatus::Returned
    }
}

impl std::str::FromStr for BookStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "returned" => Ok(BookStatus::Returned),
            "reserved" => Ok(BookStatus::Reserved),
            "borrowed" => Ok(BookStatus::Borrowed),
            _ => Err(UnknownVariant::new("book status", s)),
        }
    }
}

impl TryFrom<String> for BookStatus {
    type Error = UnknownVariant;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Physical copy of a library item
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ItemCopy {
    pub id: i32,
    /// Inventory code: two letters and six digits, e.g. `wr109100`
    pub asset_code: String,
    pub library_item_id: i32,
    pub has_cd_disk: bool,
    pub shelf: Option<String>,
    #[sqlx(try_from = "String")]
    pub available_status: BookStatus,
}

/// Validated copy content
#[derive(Debug, Clone)]
pub struct CopyDraft {
    pub asset_code: String,
    pub has_cd_disk: bool,
    pub shelf: Option<String>,
    pub available_status: BookStatus,
}
