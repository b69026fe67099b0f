//! Library item (catalog entry) model and related types.
//!
//! Books and magazines share one table; the type-specific columns are
//! optional and grouped into [`BookDetails`] and [`MagazineDetails`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::UnknownVariant;

/// Kind of library item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Book,
    Magazine,
}

impl ItemType {
    pub const ALL: [ItemType; 2] = [ItemType::Book, ItemType::Magazine];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Book => "book",
            ItemType::Magazine => "magazine",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ItemType::Book => "Book",
            ItemType::Magazine => "Magazine",
        }
    }
}

impl std::str::FromStr for ItemType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "book" => Ok(ItemType::Book),
            "magazine" => Ok(ItemType::Magazine),
            _ => Err(UnknownVariant::new("item type", s)),
        }
    }
}

impl TryFrom<String> for ItemType {
    type Error = UnknownVariant;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Language of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Polish,
    English,
    Other,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Polish, Language::English, Language::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Polish => "polish",
            Language::English => "english",
            Language::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Language::Polish => "Polish",
            Language::English => "English",
            Language::Other => "Other",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "polish" => Ok(Language::Polish),
            "english" => Ok(Language::English),
            "other" => Ok(Language::Other),
            _ => Err(UnknownVariant::new("language", s)),
        }
    }
}

/// Shelf category of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Developers,
    Managers,
    Magazines,
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Developers,
        Category::Managers,
        Category::Magazines,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Developers => "developers",
            Category::Managers => "managers",
            Category::Magazines => "magazines",
            Category::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Developers => "Developers",
            Category::Managers => "Managers",
            Category::Magazines => "Magazines",
            Category::Other => "Other",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "developers" => Ok(Category::Developers),
            "managers" => Ok(Category::Managers),
            "magazines" => Ok(Category::Magazines),
            "other" => Ok(Category::Other),
            _ => Err(UnknownVariant::new("category", s)),
        }
    }
}

/// Author of a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

impl Author {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Author name pair before it is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorName {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Tag {
    pub id: i32,
    pub name: String,
}

/// Internal row structure for `library_items`
#[derive(Debug, Clone, FromRow)]
pub struct ItemRow {
    pub id: i32,
    #[sqlx(try_from = "String")]
    pub item_type: ItemType,
    pub title: String,
    pub table_of_contents: Option<String>,
    pub language: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub isbn: Option<String>,
    pub original_title: Option<String>,
    pub publisher: Option<String>,
    pub pub_date: Option<NaiveDate>,
    pub year: Option<NaiveDate>,
    pub issue: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ItemRow {
    /// Attach relations loaded separately
    pub fn into_item(self, authors: Vec<Author>, tags: Vec<Tag>) -> LibraryItem {
        let book = match self.item_type {
            ItemType::Book => Some(BookDetails {
                isbn: self.isbn,
                original_title: self.original_title,
                publisher: self.publisher,
                pub_date: self.pub_date,
                authors,
            }),
            ItemType::Magazine => None,
        };
        let magazine = match self.item_type {
            ItemType::Magazine => Some(MagazineDetails {
                year: self.year,
                issue: self.issue,
            }),
            ItemType::Book => None,
        };

        LibraryItem {
            id: self.id,
            item_type: self.item_type,
            title: self.title,
            table_of_contents: self.table_of_contents,
            // Legacy rows may carry free-text values; unknown ones are dropped
            language: self.language.and_then(|l| l.parse().ok()),
            category: self.category.and_then(|c| c.parse().ok()),
            description: self.description,
            tags,
            book,
            magazine,
            created_at: self.created_at,
        }
    }
}

/// Book specific fields
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookDetails {
    pub isbn: Option<String>,
    pub original_title: Option<String>,
    pub publisher: Option<String>,
    pub pub_date: Option<NaiveDate>,
    pub authors: Vec<Author>,
}

/// Magazine specific fields
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MagazineDetails {
    pub year: Option<NaiveDate>,
    pub issue: Option<String>,
}

/// Full library item
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LibraryItem {
    pub id: i32,
    pub item_type: ItemType,
    pub title: String,
    pub table_of_contents: Option<String>,
    pub language: Option<Language>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub tags: Vec<Tag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<BookDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magazine: Option<MagazineDetails>,
    pub created_at: DateTime<Utc>,
}

/// Short item representation for search results
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ItemShort {
    pub id: i32,
    #[sqlx(try_from = "String")]
    pub item_type: ItemType,
    pub title: String,
    pub authors: Option<String>,
    pub nb_copies: i64,
    pub nb_available: i64,
}

/// Item search parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ItemQuery {
    pub query: Option<String>,
    pub item_type: Option<ItemType>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ItemQuery {
    /// Requested page, counted from 1
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(20).clamp(1, 100)
    }

    /// Rows skipped before the requested page; saturates for absurd page numbers
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.per_page())
    }
}

/// Validated item content, written by the repository
#[derive(Debug, Clone)]
pub struct ItemDraft {
    pub item_type: ItemType,
    pub title: String,
    pub table_of_contents: Option<String>,
    pub language: Language,
    pub category: Category,
    pub description: Option<String>,
    pub tag: Option<String>,
    pub isbn: Option<String>,
    pub original_title: Option<String>,
    pub publisher: Option<String>,
    /// Publication date of a book, or year of a magazine
    pub published: NaiveDate,
    pub issue: Option<String>,
    pub authors: Vec<AuthorName>,
}
