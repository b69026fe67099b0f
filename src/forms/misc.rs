//! Search, contact and wishlist forms

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{
    derived_errors, into_result,
    validators::{check_item_type, check_pub_date, check_required, check_title},
    Choice, FieldKind, FieldSpec, FormDefinition, FormRules,
};
use crate::{
    error::{AppError, AppResult},
    models::{item::ItemQuery, wishlist::WishDraft, ItemType},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct SearchForm {
    #[validate(
        custom(function = "check_required"),
        length(max = 100, message = "Query can have at most 100 characters.")
    )]
    pub query: String,
}

impl SearchForm {
    pub fn validate_fields(&self) -> AppResult<()> {
        into_result(derived_errors(self))?;
        Ok(())
    }

    /// Validate the free-text part of a catalog search, when one is given
    pub fn check_item_query(query: &ItemQuery) -> AppResult<()> {
        match &query.query {
            Some(text) => SearchForm { query: text.clone() }.validate_fields(),
            None => Ok(()),
        }
    }
}

impl FormDefinition for SearchForm {
    const NAME: &'static str = "search";

    fn fields(_rules: &FormRules) -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("query", "Search")
                .required()
                .class("form-control mr-sm-2")
                .id("query")
                .placeholder("Title, author, tag or ISBN"),
            FieldSpec::submit("submit", "Search").class("btn btn-outline-success my-2 my-sm-0"),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct ContactForm {
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
    #[validate(
        custom(function = "check_required"),
        length(max = 100, message = "Title can have at most 100 characters.")
    )]
    pub title: String,
    #[validate(custom(function = "check_required"))]
    pub message: String,
}

impl ContactForm {
    pub fn validate_fields(&self) -> AppResult<()> {
        into_result(derived_errors(self))?;
        Ok(())
    }
}

impl FormDefinition for ContactForm {
    const NAME: &'static str = "contact";

    fn fields(_rules: &FormRules) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("email", "Email", FieldKind::Email)
                .required()
                .class("inputs")
                .id("email")
                .placeholder("Email"),
            FieldSpec::text("title", "Title")
                .required()
                .class("inputs")
                .id("title")
                .placeholder("Title"),
            FieldSpec::text_area("message", "Message")
                .required()
                .class("inputs")
                .id("message")
                .placeholder("Message"),
            FieldSpec::submit("submit", "Send")
                .class("btn btn-primary submits")
                .id("button"),
        ]
    }
}

/// Propose a title for purchase
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct WishlistForm {
    #[validate(custom(function = "check_required"))]
    pub authors: String,
    #[validate(custom(function = "check_required"), custom(function = "check_title"))]
    pub title: String,
    pub pub_date: String,
    #[serde(rename = "type")]
    #[validate(custom(function = "check_item_type"))]
    pub item_type: String,
}

impl WishlistForm {
    pub fn validate_with(&self, rules: &FormRules) -> AppResult<()> {
        let mut errors = derived_errors(self);
        if let Err(e) = check_pub_date(&self.pub_date, rules) {
            errors.add("pub_date", e);
        }
        into_result(errors)?;
        Ok(())
    }

    pub fn into_draft(self) -> AppResult<WishDraft> {
        let item_type: ItemType = self
            .item_type
            .parse()
            .map_err(|e: crate::models::UnknownVariant| AppError::Validation(e.to_string()))?;
        let year: i32 = self
            .pub_date
            .trim()
            .parse()
            .map_err(|_| AppError::Validation("Invalid publication year".to_string()))?;
        let pub_year = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| AppError::Validation("Invalid publication year".to_string()))?;

        Ok(WishDraft {
            authors: self.authors.trim().to_string(),
            title: self.title.trim().to_string(),
            pub_year,
            item_type,
        })
    }
}

impl FormDefinition for WishlistForm {
    const NAME: &'static str = "wishlist";

    fn fields(rules: &FormRules) -> Vec<FieldSpec> {
        let years = rules
            .publication_years()
            .map(|y| Choice::new(y.to_string(), y.to_string()))
            .collect();
        let types = ItemType::ALL
            .iter()
            .map(|t| Choice::new(t.as_str(), t.label()))
            .collect();

        vec![
            FieldSpec::text("authors", "Authors")
                .required()
                .class("inputs")
                .id("authors")
                .placeholder("Authors"),
            FieldSpec::text("title", "Title")
                .required()
                .class("inputs")
                .id("title")
                .placeholder("Title"),
            FieldSpec::select("pub_date", "Year of publication", years)
                .class("inputs custom-select")
                .id("pub_date"),
            FieldSpec::new("type", "Type", FieldKind::Radio)
                .choices(types)
                .class("radio_but"),
            FieldSpec::submit("submit", "Add")
                .class("btn btn-primary submits")
                .id("button"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> FormRules {
        FormRules {
            registration_domain: "tieto.com".to_string(),
            first_publication_year: 1970,
            current_year: 2018,
        }
    }

    #[test]
    fn test_search_form() {
        assert!(SearchForm { query: "rust".to_string() }.validate_fields().is_ok());
        assert!(SearchForm { query: "  ".to_string() }.validate_fields().is_err());
        assert!(SearchForm { query: "x".repeat(101) }.validate_fields().is_err());
    }

    #[test]
    fn test_item_query_text_is_checked() {
        let mut query = ItemQuery {
            query: None,
            item_type: Some(ItemType::Book),
            page: None,
            per_page: None,
        };
        assert!(SearchForm::check_item_query(&query).is_ok());

        query.query = Some("clean code".to_string());
        assert!(SearchForm::check_item_query(&query).is_ok());

        query.query = Some("a".repeat(101));
        assert!(matches!(SearchForm::check_item_query(&query), Err(AppError::Form(_))));

        query.query = Some("   ".to_string());
        assert!(matches!(SearchForm::check_item_query(&query), Err(AppError::Form(_))));
    }

    #[test]
    fn test_contact_form() {
        let form = ContactForm {
            email: "anna@example.org".to_string(),
            title: "Opening hours".to_string(),
            message: "Are you open on Saturday?".to_string(),
        };
        assert!(form.validate_fields().is_ok());
        let bad = ContactForm {
            email: "not-an-email".to_string(),
            ..form
        };
        assert!(bad.validate_fields().is_err());
    }

    #[test]
    fn test_wishlist_form_reads_type_key() {
        let form: WishlistForm = serde_json::from_value(serde_json::json!({
            "authors": "Nowak Anna",
            "title": "Rust in Action",
            "pub_date": "2018",
            "type": "book"
        }))
        .unwrap();
        assert!(form.validate_with(&rules()).is_ok());
        let draft = form.into_draft().unwrap();
        assert_eq!(draft.item_type, ItemType::Book);
        assert_eq!(draft.pub_year, NaiveDate::from_ymd_opt(2018, 1, 1).unwrap());
    }

    #[test]
    fn test_wishlist_form_rejects_bad_year_and_type() {
        let form = WishlistForm {
            authors: "Nowak Anna".to_string(),
            title: "Rust in Action".to_string(),
            pub_date: "1900".to_string(),
            item_type: "dvd".to_string(),
        };
        assert!(form.validate_with(&rules()).is_err());
    }
}
