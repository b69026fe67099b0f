//! Book and magazine forms

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use super::{
    derived_errors, field_error, into_result, non_blank,
    validators::{
        check_author, check_category, check_isbn, check_item_type, check_language, check_pub_date, check_required,
        check_title, normalize_isbn,
    },
    CatalogLookup, Choice, FieldSpec, FieldKind, FormDefinition, FormRules,
};
use crate::{
    error::{AppError, AppResult},
    models::{
        item::{AuthorName, ItemDraft},
        Category, ItemType, Language,
    },
};

const SELECT_CLASS: &str = "inputs custom-select mb-2 mr-sm-2 mb-sm-0";

/// Fields shared by every library item form
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LibraryItemFields {
    /// Item type radio (`book` or `magazine`)
    pub radio: String,
    pub table_of_contents: String,
    pub language: String,
    pub category: String,
    pub tag: String,
    pub description: String,
    /// Year of publication
    pub pub_date: String,
}

impl LibraryItemFields {
    /// Check the shared fields of a form editing `expected` items, adding failures to `errors`
    pub fn check(&self, expected: ItemType, rules: &FormRules, errors: &mut ValidationErrors) {
        if let Err(e) = check_item_type(&self.radio) {
            errors.add("radio", e);
        } else if self.radio.parse::<ItemType>().ok() != Some(expected) {
            errors.add("radio", field_error("item_type_mismatch", "Item type does not match this form."));
        }
        if let Err(e) = check_language(&self.language) {
            errors.add("language", e);
        }
        if let Err(e) = check_category(&self.category) {
            errors.add("category", e);
        }
        if let Err(e) = check_pub_date(&self.pub_date, rules) {
            errors.add("pub_date", e);
        }
    }

    fn fields(rules: &FormRules) -> Vec<FieldSpec> {
        let item_types = ItemType::ALL
            .iter()
            .map(|t| Choice::new(t.as_str(), t.label()))
            .collect();
        let languages = Language::ALL
            .iter()
            .map(|l| Choice::new(l.as_str(), l.label()))
            .collect();
        let categories = Category::ALL
            .iter()
            .map(|c| Choice::new(c.as_str(), c.label()))
            .collect();
        let years = rules
            .publication_years()
            .map(|y| Choice::new(y.to_string(), y.to_string()))
            .collect();

        vec![
            FieldSpec::new("radio", "radio", FieldKind::Radio)
                .choices(item_types)
                .class("radio_but"),
            FieldSpec::text_area("table_of_contents", "Table of contents")
                .class("inputs")
                .id("table_of_contest")
                .placeholder("Table of contents"),
            FieldSpec::select("language", "Language", languages)
                .class(SELECT_CLASS)
                .id("mySelect")
                .placeholder("Language"),
            FieldSpec::select("category", "Category", categories)
                .class(SELECT_CLASS)
                .id("mySelect")
                .placeholder("Category"),
            FieldSpec::text("tag", "Tag")
                .class("inputs")
                .id("tag")
                .placeholder("Tag"),
            FieldSpec::text_area("description", "Description")
                .class("inputs")
                .id("description")
                .placeholder("Description"),
            FieldSpec::select("pub_date", "Year of publication", years)
                .class(SELECT_CLASS)
                .id("mySelect")
                .placeholder("Year of publication"),
            FieldSpec::submit("submit", "Update")
                .class("btn btn-primary submits")
                .id("button"),
        ]
    }

    /// Draft with the shared fields filled in; call after validation
    fn draft(&self, item_type: ItemType, title: &str) -> AppResult<ItemDraft> {
        let language = self
            .language
            .parse()
            .map_err(|e: crate::models::UnknownVariant| AppError::Validation(e.to_string()))?;
        let category = self
            .category
            .parse()
            .map_err(|e: crate::models::UnknownVariant| AppError::Validation(e.to_string()))?;
        let year: i32 = self
            .pub_date
            .trim()
            .parse()
            .map_err(|_| AppError::Validation("Invalid publication year".to_string()))?;
        let published = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| AppError::Validation("Invalid publication year".to_string()))?;

        Ok(ItemDraft {
            item_type,
            title: title.trim().nfc().collect(),
            table_of_contents: non_blank(&self.table_of_contents),
            language,
            category,
            description: non_blank(&self.description),
            tag: non_blank(&self.tag),
            isbn: None,
            original_title: None,
            publisher: None,
            published,
            issue: None,
            authors: Vec::new(),
        })
    }
}

/// Edit form of a book
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct BookForm {
    #[serde(flatten)]
    pub item: LibraryItemFields,

    #[validate(custom(function = "check_required"), custom(function = "check_title"))]
    pub title: String,

    #[validate(custom(function = "check_required"), custom(function = "check_isbn"))]
    pub isbn: String,

    pub original_title: String,

    #[validate(custom(function = "check_required"))]
    pub publisher: String,

    #[validate(custom(function = "check_required"), custom(function = "check_author"))]
    pub first_name: String,
    #[validate(custom(function = "check_required"), custom(function = "check_author"))]
    pub surname: String,

    #[validate(custom(function = "check_author"))]
    pub first_name_1: String,
    #[validate(custom(function = "check_author"))]
    pub surname_1: String,

    #[validate(custom(function = "check_author"))]
    pub first_name_2: String,
    #[validate(custom(function = "check_author"))]
    pub surname_2: String,
}

impl BookForm {
    /// Validate every field; `editing` names the book being edited, if any
    pub async fn validate_with(
        &self,
        lookup: &dyn CatalogLookup,
        rules: &FormRules,
        editing: Option<i32>,
    ) -> AppResult<()> {
        let mut errors = derived_errors(self);
        self.item.check(ItemType::Book, rules, &mut errors);

        // The optional author slots are filled as pairs
        for (first_field, first, surname_field, surname) in [
            ("first_name_1", &self.first_name_1, "surname_1", &self.surname_1),
            ("first_name_2", &self.first_name_2, "surname_2", &self.surname_2),
        ] {
            match (first.trim().is_empty(), surname.trim().is_empty()) {
                (false, true) => errors.add(surname_field, field_error("author_pair", "Surname is required for this author.")),
                (true, false) => errors.add(first_field, field_error("author_pair", "First name is required for this author.")),
                _ => {}
            }
        }

        let title = self.title.trim();
        if title.chars().count() >= 3 && lookup.book_title_exists(title, editing).await? {
            errors.add("title", field_error("title_exists", "Book with this title already exists."));
        }

        into_result(errors)?;
        Ok(())
    }

    /// Authors in slot order, skipping empty slots
    pub fn authors(&self) -> Vec<AuthorName> {
        [
            (&self.first_name, &self.surname),
            (&self.first_name_1, &self.surname_1),
            (&self.first_name_2, &self.surname_2),
        ]
        .into_iter()
        .filter(|(first, last)| !first.trim().is_empty() && !last.trim().is_empty())
        .map(|(first, last)| AuthorName {
            first_name: first.trim().to_string(),
            last_name: last.trim().to_string(),
        })
        .collect()
    }

    pub fn into_draft(self) -> AppResult<ItemDraft> {
        let mut draft = self.item.draft(ItemType::Book, &self.title)?;
        draft.authors = self.authors();
        draft.isbn = Some(normalize_isbn(&self.isbn));
        draft.original_title = non_blank(&self.original_title);
        draft.publisher = non_blank(&self.publisher);
        Ok(draft)
    }

    fn book_fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("title", "Title")
                .required()
                .class("inputs")
                .id("title")
                .placeholder("Title"),
            FieldSpec::text("isbn", "ISBN number")
                .required()
                .class("inputs")
                .id("isbn")
                .placeholder("ISBN number"),
            FieldSpec::text("original_title", "Original title")
                .class("inputs")
                .id("original_title")
                .placeholder("Original title"),
            FieldSpec::text("publisher", "Publisher")
                .required()
                .class("inputs")
                .id("publisher")
                .placeholder("Publisher"),
            FieldSpec::text("first_name", "First name")
                .required()
                .class("inputs")
                .placeholder("First Name"),
            FieldSpec::text("surname", "Surname")
                .required()
                .class("inputs")
                .placeholder("Surname"),
            FieldSpec::text("first_name_1", "First_name_1")
                .class("inputs")
                .placeholder("First Name 1"),
            FieldSpec::text("surname_1", "Surname_1")
                .class("inputs")
                .placeholder("Surname 1"),
            FieldSpec::text("first_name_2", "First name 2")
                .class("inputs")
                .placeholder("First Name 2"),
            FieldSpec::text("surname_2", "Surname 2")
                .class("inputs")
                .placeholder("Surname 2"),
        ]
    }
}

impl FormDefinition for BookForm {
    const NAME: &'static str = "book";

    fn fields(rules: &FormRules) -> Vec<FieldSpec> {
        let mut fields = LibraryItemFields::fields(rules);
        fields.extend(Self::book_fields());
        fields
    }
}

/// Edit form of a magazine
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct MagazineForm {
    #[serde(flatten)]
    pub item: LibraryItemFields,

    #[validate(custom(function = "check_required"), custom(function = "check_title"))]
    pub title_of_magazine: String,

    pub issue: String,
}

impl MagazineForm {
    pub fn validate_with(&self, rules: &FormRules) -> AppResult<()> {
        let mut errors = derived_errors(self);
        self.item.check(ItemType::Magazine, rules, &mut errors);
        into_result(errors)?;
        Ok(())
    }

    pub fn into_draft(self) -> AppResult<ItemDraft> {
        let mut draft = self.item.draft(ItemType::Magazine, &self.title_of_magazine)?;
        draft.issue = non_blank(&self.issue);
        Ok(draft)
    }

    fn magazine_fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("title_of_magazine", "Title")
                .required()
                .class("inputs")
                .id("title_of_magazine")
                .placeholder("Title of magazine"),
            FieldSpec::text("issue", "Issue")
                .class("inputs")
                .id("issue")
                .placeholder("Issue"),
        ]
    }
}

impl FormDefinition for MagazineForm {
    const NAME: &'static str = "magazine";

    fn fields(rules: &FormRules) -> Vec<FieldSpec> {
        let mut fields = LibraryItemFields::fields(rules);
        fields.extend(Self::magazine_fields());
        fields
    }
}

/// Book form used on the "new item" page
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AddNewItemBookForm {
    #[serde(flatten)]
    pub book: BookForm,
}

impl AddNewItemBookForm {
    pub async fn validate_with(&self, lookup: &dyn CatalogLookup, rules: &FormRules) -> AppResult<()> {
        self.book.validate_with(lookup, rules, None).await
    }
}

impl FormDefinition for AddNewItemBookForm {
    const NAME: &'static str = "add_book";

    fn fields(rules: &FormRules) -> Vec<FieldSpec> {
        let mut fields = BookForm::fields(rules);
        fields.push(
            FieldSpec::submit("submit1", "Create Book")
                .class("btn btn-primary submits")
                .id("button1"),
        );
        fields
    }
}

/// Magazine form used on the "new item" page
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AddNewItemMagazineForm {
    #[serde(flatten)]
    pub magazine: MagazineForm,
}

impl FormDefinition for AddNewItemMagazineForm {
    const NAME: &'static str = "add_magazine";

    fn fields(rules: &FormRules) -> Vec<FieldSpec> {
        let mut fields = MagazineForm::fields(rules);
        fields.push(
            FieldSpec::submit("submit2", "Create Magazine")
                .class("btn btn-primary submits")
                .id("button2"),
        );
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::field_messages;
    use crate::forms::MockCatalogLookup;

    fn rules() -> FormRules {
        FormRules {
            registration_domain: "tieto.com".to_string(),
            first_publication_year: 1970,
            current_year: 2018,
        }
    }

    fn item_fields() -> LibraryItemFields {
        LibraryItemFields {
            radio: "book".to_string(),
            table_of_contents: "1. Meaningful names".to_string(),
            language: "english".to_string(),
            category: "developers".to_string(),
            tag: "craftsmanship".to_string(),
            description: "A handbook of agile software craftsmanship".to_string(),
            pub_date: "2008".to_string(),
        }
    }

    fn book_form() -> BookForm {
        BookForm {
            item: item_fields(),
            title: "Clean Code".to_string(),
            isbn: "1861972717".to_string(),
            original_title: "Clean Code".to_string(),
            publisher: "Prentice Hall".to_string(),
            first_name: "Robert".to_string(),
            surname: "Martin".to_string(),
            ..Default::default()
        }
    }

    fn lookup_with_titles(titles: &'static [&'static str]) -> MockCatalogLookup {
        let mut lookup = MockCatalogLookup::new();
        lookup
            .expect_book_title_exists()
            .returning(move |title, _| Ok(titles.iter().any(|t| t.eq_ignore_ascii_case(title))));
        lookup
    }

    async fn failing_fields(form: &BookForm, lookup: &MockCatalogLookup, editing: Option<i32>) -> Vec<String> {
        match form.validate_with(lookup, &rules(), editing).await {
            Ok(()) => Vec::new(),
            Err(AppError::Form(errors)) => field_messages(&errors).into_keys().collect(),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[tokio::test]
    async fn test_valid_book_form() {
        let lookup = lookup_with_titles(&[]);
        assert!(failing_fields(&book_form(), &lookup, None).await.is_empty());
    }

    #[tokio::test]
    async fn test_existing_title_rejected_on_create() {
        let lookup = lookup_with_titles(&["clean code"]);
        assert_eq!(failing_fields(&book_form(), &lookup, None).await, vec!["title"]);
    }

    #[tokio::test]
    async fn test_edited_book_excluded_from_title_check() {
        let mut lookup = MockCatalogLookup::new();
        lookup
            .expect_book_title_exists()
            .withf(|_, exclude| *exclude == Some(12))
            .returning(|_, _| Ok(false));
        assert!(failing_fields(&book_form(), &lookup, Some(12)).await.is_empty());
    }

    #[tokio::test]
    async fn test_short_title_skips_lookup() {
        let mut lookup = MockCatalogLookup::new();
        lookup.expect_book_title_exists().never();
        let mut form = book_form();
        form.title = "Go".to_string();
        assert_eq!(failing_fields(&form, &lookup, None).await, vec!["title"]);
    }

    #[tokio::test]
    async fn test_blank_title_is_required() {
        let mut lookup = MockCatalogLookup::new();
        lookup.expect_book_title_exists().never();
        let mut form = book_form();
        form.title = "     ".to_string();
        let err = form.validate_with(&lookup, &rules(), None).await.unwrap_err();
        match err {
            AppError::Form(errors) => {
                assert_eq!(field_messages(&errors)["title"], vec!["This field is required.".to_string()]);
            }
            e => panic!("unexpected error: {e}"),
        }

        form.title = "  Go  ".to_string();
        assert_eq!(failing_fields(&form, &lookup, None).await, vec!["title"]);
    }

    #[tokio::test]
    async fn test_radio_must_match_form() {
        let lookup = lookup_with_titles(&[]);
        let mut form = book_form();
        form.item.radio = "magazine".to_string();
        assert_eq!(failing_fields(&form, &lookup, None).await, vec!["radio"]);
    }

    #[tokio::test]
    async fn test_missing_required_and_bad_choices() {
        let lookup = lookup_with_titles(&[]);
        let form = BookForm {
            item: LibraryItemFields {
                radio: "dvd".to_string(),
                language: "german".to_string(),
                category: "kids".to_string(),
                pub_date: "1950".to_string(),
                ..Default::default()
            },
            title: "Refactoring".to_string(),
            isbn: "1861972718".to_string(),
            ..Default::default()
        };
        let fields = failing_fields(&form, &lookup, None).await;
        assert_eq!(
            fields,
            vec!["category", "first_name", "isbn", "language", "pub_date", "publisher", "radio", "surname"]
        );
    }

    #[tokio::test]
    async fn test_author_slots_must_be_pairs() {
        let lookup = lookup_with_titles(&[]);
        let mut form = book_form();
        form.first_name_1 = "Kent".to_string();
        form.surname_2 = "Fowler".to_string();
        assert_eq!(failing_fields(&form, &lookup, None).await, vec!["first_name_2", "surname_1"]);
    }

    #[test]
    fn test_book_draft() {
        let mut form = book_form();
        form.isbn = "978-0-13-235088-4".to_string();
        form.first_name_1 = "Kent".to_string();
        form.surname_1 = "Beck".to_string();
        let draft = form.into_draft().unwrap();
        assert_eq!(draft.item_type, ItemType::Book);
        assert_eq!(draft.isbn.as_deref(), Some("9780132350884"));
        assert_eq!(draft.published, NaiveDate::from_ymd_opt(2008, 1, 1).unwrap());
        assert_eq!(draft.authors.len(), 2);
        assert_eq!(draft.authors[1].last_name, "Beck");
        assert_eq!(draft.language, Language::English);
    }

    #[test]
    fn test_magazine_form() {
        let form = MagazineForm {
            item: LibraryItemFields {
                radio: "magazine".to_string(),
                ..item_fields()
            },
            title_of_magazine: "Programista".to_string(),
            issue: "".to_string(),
        };
        assert!(form.validate_with(&rules()).is_ok());
        let draft = form.into_draft().unwrap();
        assert_eq!(draft.item_type, ItemType::Magazine);
        assert_eq!(draft.issue, None);

        let short = MagazineForm {
            item: item_fields(),
            title_of_magazine: "IT".to_string(),
            issue: "3".to_string(),
        };
        assert!(matches!(short.validate_with(&rules()), Err(AppError::Form(_))));
    }

    #[test]
    fn test_magazine_form_rejects_blank_title_and_book_radio() {
        let blank = MagazineForm {
            item: LibraryItemFields {
                radio: "magazine".to_string(),
                ..item_fields()
            },
            title_of_magazine: "   ".to_string(),
            issue: "3".to_string(),
        };
        let Err(AppError::Form(errors)) = blank.validate_with(&rules()) else {
            panic!("blank magazine title accepted");
        };
        assert_eq!(field_messages(&errors).into_keys().collect::<Vec<_>>(), vec!["title_of_magazine"]);

        let as_book = MagazineForm {
            item: item_fields(),
            title_of_magazine: "Programista".to_string(),
            issue: "3".to_string(),
        };
        let Err(AppError::Form(errors)) = as_book.validate_with(&rules()) else {
            panic!("book radio accepted on the magazine form");
        };
        assert_eq!(field_messages(&errors).into_keys().collect::<Vec<_>>(), vec!["radio"]);
    }

    #[test]
    fn test_book_form_deserializes_flat_body() {
        let body = serde_json::json!({
            "radio": "book",
            "language": "polish",
            "category": "managers",
            "pub_date": "2015",
            "title": "Scrum",
            "isbn": "9789295055025",
            "publisher": "Helion",
            "first_name": "Jeff",
            "surname": "Sutherland",
            "submit1": "Create Book"
        });
        let form: AddNewItemBookForm = serde_json::from_value(body).unwrap();
        assert_eq!(form.book.item.language, "polish");
        assert_eq!(form.book.title, "Scrum");
        assert!(form.book.first_name_1.is_empty());
    }

    #[test]
    fn test_schema_field_order_and_buttons() {
        let schema = AddNewItemBookForm::form_schema(&rules());
        assert_eq!(schema.fields.first().map(|f| f.name), Some("radio"));
        assert_eq!(schema.fields.last().map(|f| f.label), Some("Create Book"));
        let pub_date = schema.field("pub_date").unwrap();
        assert_eq!(pub_date.choices.len(), 49);
        assert_eq!(pub_date.render_kw["placeholder"], "Year of publication");
        assert!(schema.field("isbn").unwrap().required);

        let magazine = AddNewItemMagazineForm::form_schema(&rules());
        assert_eq!(magazine.fields.last().map(|f| f.name), Some("submit2"));
        assert!(magazine.field("title").is_none());
    }
}
