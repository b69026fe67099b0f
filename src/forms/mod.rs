//! Form definitions.
//!
//! Every form is a plain struct deserialized from a request body. Validation
//! runs in two passes: the synchronous field rules (`validator` derive plus the
//! checks in [`validators`]) and the cross-checks against stored data through
//! [`CatalogLookup`]. Both passes collect into a single [`ValidationErrors`] so a
//! client sees every invalid field at once.
//!
//! Forms also describe how they are rendered: [`FormDefinition::form_schema`]
//! returns the ordered fields with their labels, widgets, choices and HTML
//! attributes.

pub mod account;
pub mod book;
pub mod copy;
pub mod misc;
pub mod validators;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

use crate::{config::LibraryConfig, error::AppResult};

pub use account::{
    EditPasswordForm, EditProfileForm, ForgotPass, LoginForm, RegistrationForm, ResetPasswordForm,
};
pub use book::{AddNewItemBookForm, AddNewItemMagazineForm, BookForm, LibraryItemFields, MagazineForm};
pub use copy::{CopyAddForm, CopyEditForm};
pub use misc::{ContactForm, SearchForm, WishlistForm};

/// Stored-data checks needed by the forms
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// A book titled `title` exists (case-insensitive), ignoring item `exclude`
    async fn book_title_exists(&self, title: &str, exclude: Option<i32>) -> AppResult<bool>;

    /// A copy carries `asset_code`, ignoring copy `exclude`
    async fn asset_code_exists(&self, asset_code: &str, exclude: Option<i32>) -> AppResult<bool>;

    /// An account uses `email`, ignoring user `exclude`
    async fn email_registered(&self, email: &str, exclude: Option<i32>) -> AppResult<bool>;
}

/// Deployment-dependent rules shared by the forms
#[derive(Debug, Clone)]
pub struct FormRules {
    pub registration_domain: String,
    pub first_publication_year: i32,
    pub current_year: i32,
}

impl FormRules {
    pub fn from_config(config: &LibraryConfig) -> Self {
        Self {
            registration_domain: config.registration_domain.clone(),
            first_publication_year: config.first_publication_year,
            current_year: Utc::now().year(),
        }
    }

    /// Years offered by the publication date select, oldest first
    pub fn publication_years(&self) -> impl Iterator<Item = i32> {
        self.first_publication_year..=self.current_year
    }
}

impl Default for FormRules {
    fn default() -> Self {
        Self::from_config(&LibraryConfig::default())
    }
}

/// Widget used to render a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    TextArea,
    Email,
    Password,
    Select,
    Radio,
    Checkbox,
    Hidden,
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Rendering metadata of one field
#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    /// HTML attributes passed through to the widget
    pub render_kw: IndexMap<&'static str, String>,
}

impl FieldSpec {
    pub fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            choices: Vec::new(),
            render_kw: IndexMap::new(),
        }
    }

    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub fn text_area(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::TextArea)
    }

    pub fn select(name: &'static str, label: &'static str, choices: Vec<Choice>) -> Self {
        Self::new(name, label, FieldKind::Select).choices(choices)
    }

    pub fn submit(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Submit)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = choices;
        self
    }

    pub fn attr(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.render_kw.insert(key, value.into());
        self
    }

    pub fn class(self, value: impl Into<String>) -> Self {
        self.attr("class", value)
    }

    pub fn id(self, value: impl Into<String>) -> Self {
        self.attr("id", value)
    }

    pub fn placeholder(self, value: impl Into<String>) -> Self {
        self.attr("placeholder", value)
    }
}

/// Rendering metadata of a whole form
#[derive(Debug, Clone, Serialize)]
pub struct FormSchema {
    pub name: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl FormSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Form exposing its rendering metadata
pub trait FormDefinition {
    const NAME: &'static str;

    fn fields(rules: &FormRules) -> Vec<FieldSpec>;

    fn form_schema(rules: &FormRules) -> FormSchema {
        FormSchema {
            name: Self::NAME,
            fields: Self::fields(rules),
        }
    }
}

/// Schemas of every form, in registration order
pub fn all_schemas(rules: &FormRules) -> Vec<FormSchema> {
    vec![
        BookForm::form_schema(rules),
        MagazineForm::form_schema(rules),
        AddNewItemBookForm::form_schema(rules),
        AddNewItemMagazineForm::form_schema(rules),
        CopyAddForm::form_schema(rules),
        CopyEditForm::form_schema(rules),
        LoginForm::form_schema(rules),
        RegistrationForm::form_schema(rules),
        ForgotPass::form_schema(rules),
        ResetPasswordForm::form_schema(rules),
        EditPasswordForm::form_schema(rules),
        EditProfileForm::form_schema(rules),
        SearchForm::form_schema(rules),
        ContactForm::form_schema(rules),
        WishlistForm::form_schema(rules),
    ]
}

/// Schema of a form by its registered name
pub fn schema_by_name(name: &str, rules: &FormRules) -> Option<FormSchema> {
    all_schemas(rules).into_iter().find(|schema| schema.name == name)
}

/// Build a field error carrying a human readable message
pub fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Start the error set from the derived field rules
pub(crate) fn derived_errors<T: validator::Validate>(form: &T) -> ValidationErrors {
    form.validate().err().unwrap_or_else(ValidationErrors::new)
}

/// `Ok` when nothing was collected
pub(crate) fn into_result(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    if errors.field_errors().is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Trimmed value, `None` when blank
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
