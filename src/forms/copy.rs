//! Copy forms

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{
    derived_errors, field_error, into_result, non_blank,
    validators::{check_asset_code, check_book_status},
    CatalogLookup, Choice, FieldKind, FieldSpec, FormDefinition, FormRules,
};
use crate::{
    error::{AppError, AppResult},
    models::{copy::CopyDraft, BookStatus},
};

/// Add a copy to an item
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct CopyAddForm {
    #[validate(custom(function = "check_asset_code"))]
    pub asset_code: String,
    pub has_cd_disk: bool,
    pub shelf: String,
}

impl CopyAddForm {
    pub async fn validate_with(&self, lookup: &dyn CatalogLookup) -> AppResult<()> {
        let mut errors = derived_errors(self);
        let code = self.asset_code.trim();
        if check_asset_code(code).is_ok() && lookup.asset_code_exists(code, None).await? {
            errors.add("asset_code", field_error("asset_code_taken", "Copy with this asset code already exists."));
        }
        into_result(errors)?;
        Ok(())
    }

    pub fn into_draft(self) -> CopyDraft {
        CopyDraft {
            asset_code: self.asset_code.trim().to_lowercase(),
            has_cd_disk: self.has_cd_disk,
            shelf: non_blank(&self.shelf),
            available_status: BookStatus::Returned,
        }
    }
}

fn copy_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::text("asset_code", "Asset code")
            .required()
            .class("inputs")
            .id("asset_code")
            .placeholder("Asset code"),
        FieldSpec::new("has_cd_disk", "CD disk", FieldKind::Checkbox).id("has_cd_disk"),
        FieldSpec::text("shelf", "Shelf")
            .class("inputs")
            .id("shelf")
            .placeholder("Shelf"),
    ]
}

impl FormDefinition for CopyAddForm {
    const NAME: &'static str = "copy_add";

    fn fields(_rules: &FormRules) -> Vec<FieldSpec> {
        let mut fields = copy_fields();
        fields.push(
            FieldSpec::submit("submit", "Add copy")
                .class("btn btn-primary submits")
                .id("button"),
        );
        fields
    }
}

/// Edit an existing copy
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct CopyEditForm {
    #[validate(custom(function = "check_asset_code"))]
    pub asset_code: String,
    pub has_cd_disk: bool,
    #[validate(custom(function = "check_book_status"))]
    pub available_status: String,
    pub shelf: String,
}

impl CopyEditForm {
    /// Validate; `copy_id` is excluded from the asset code uniqueness check
    pub async fn validate_with(&self, lookup: &dyn CatalogLookup, copy_id: i32) -> AppResult<()> {
        let mut errors = derived_errors(self);
        let code = self.asset_code.trim();
        if check_asset_code(code).is_ok() && lookup.asset_code_exists(code, Some(copy_id)).await? {
            errors.add("asset_code", field_error("asset_code_taken", "Copy with this asset code already exists."));
        }
        into_result(errors)?;
        Ok(())
    }

    pub fn into_draft(self) -> AppResult<CopyDraft> {
        let available_status = self
            .available_status
            .parse()
            .map_err(|e: crate::models::UnknownVariant| AppError::Validation(e.to_string()))?;
        Ok(CopyDraft {
            asset_code: self.asset_code.trim().to_lowercase(),
            has_cd_disk: self.has_cd_disk,
            shelf: non_blank(&self.shelf),
            available_status,
        })
    }
}

impl FormDefinition for CopyEditForm {
    const NAME: &'static str = "copy_edit";

    fn fields(_rules: &FormRules) -> Vec<FieldSpec> {
        let statuses = BookStatus::ALL
            .iter()
            .map(|s| Choice::new(s.as_str(), s.label()))
            .collect();
        let mut fields = copy_fields();
        fields.push(
            FieldSpec::select("available_status", "Status", statuses)
                .class("inputs custom-select")
                .id("available_status"),
        );
        fields.push(
            FieldSpec::submit("submit", "Save")
                .class("btn btn-primary submits")
                .id("button"),
        );
        fields
    }
}
