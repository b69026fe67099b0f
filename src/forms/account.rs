//! Account forms: sign in, registration, password and profile management

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{
    derived_errors, field_error, into_result,
    validators::{check_email_domain, check_password_strength, check_person_name, check_required},
    CatalogLookup, FieldKind, FieldSpec, FormDefinition, FormRules,
};
use crate::error::AppResult;

fn email_field() -> FieldSpec {
    FieldSpec::new("email", "Email", FieldKind::Email)
        .required()
        .class("inputs")
        .id("email")
        .placeholder("Email")
}

fn password_field(name: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec::new(name, label, FieldKind::Password)
        .required()
        .class("inputs")
        .id(name)
        .placeholder(label)
}

fn name_fields() -> [FieldSpec; 2] {
    [
        FieldSpec::text("first_name", "First name")
            .required()
            .class("inputs")
            .id("first_name")
            .placeholder("First name"),
        FieldSpec::text("surname", "Surname")
            .required()
            .class("inputs")
            .id("surname")
            .placeholder("Surname"),
    ]
}

fn submit(label: &'static str) -> FieldSpec {
    FieldSpec::submit("submit", label)
        .class("btn btn-primary submits")
        .id("button")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct LoginForm {
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
    #[validate(custom(function = "check_required"))]
    pub password: String,
}

impl LoginForm {
    pub fn validate_fields(&self) -> AppResult<()> {
        into_result(derived_errors(self))?;
        Ok(())
    }
}

impl FormDefinition for LoginForm {
    const NAME: &'static str = "login";

    fn fields(_rules: &FormRules) -> Vec<FieldSpec> {
        vec![email_field(), password_field("password", "Password"), submit("Sign In")]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct RegistrationForm {
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
    #[validate(custom(function = "check_required"), custom(function = "check_person_name"))]
    pub first_name: String,
    #[validate(custom(function = "check_required"), custom(function = "check_person_name"))]
    pub surname: String,
    #[validate(custom(function = "check_password_strength"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords must match."))]
    pub confirm_pass: String,
}

impl RegistrationForm {
    pub async fn validate_with(&self, lookup: &dyn CatalogLookup, rules: &FormRules) -> AppResult<()> {
        let mut errors = derived_errors(self);
        let email = self.email.trim();
        if let Err(e) = check_email_domain(email, rules) {
            errors.add("email", e);
        } else if lookup.email_registered(email, None).await? {
            errors.add("email", field_error("email_taken", "This email is already registered."));
        }
        into_result(errors)?;
        Ok(())
    }
}

impl FormDefinition for RegistrationForm {
    const NAME: &'static str = "registration";

    fn fields(_rules: &FormRules) -> Vec<FieldSpec> {
        let mut fields = vec![email_field()];
        fields.extend(name_fields());
        fields.push(password_field("password", "Password"));
        fields.push(password_field("confirm_pass", "Confirm password"));
        fields.push(submit("Register"));
        fields
    }
}

/// Request a password reset link
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct ForgotPass {
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
}

impl ForgotPass {
    pub fn validate_fields(&self) -> AppResult<()> {
        into_result(derived_errors(self))?;
        Ok(())
    }
}

impl FormDefinition for ForgotPass {
    const NAME: &'static str = "forgot_password";

    fn fields(_rules: &FormRules) -> Vec<FieldSpec> {
        vec![email_field(), submit("Reset password")]
    }
}

/// Set a new password with a token received by email
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct ResetPasswordForm {
    #[validate(custom(function = "check_required"))]
    pub token: String,
    #[validate(custom(function = "check_password_strength"))]
    pub new_password: String,
    #[validate(must_match(other = "new_password", message = "Passwords must match."))]
    pub confirm_password: String,
}

impl ResetPasswordForm {
    pub fn validate_fields(&self) -> AppResult<()> {
        into_result(derived_errors(self))?;
        Ok(())
    }
}

impl FormDefinition for ResetPasswordForm {
    const NAME: &'static str = "reset_password";

    fn fields(_rules: &FormRules) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("token", "token", FieldKind::Hidden),
            password_field("new_password", "New password"),
            password_field("confirm_password", "Confirm password"),
            submit("Set password"),
        ]
    }
}

/// Change the password of the signed-in user
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct EditPasswordForm {
    #[validate(custom(function = "check_required"))]
    pub password: String,
    #[validate(custom(function = "check_password_strength"))]
    pub new_password: String,
    #[validate(must_match(other = "new_password", message = "Passwords must match."))]
    pub confirm_password: String,
}

impl EditPasswordForm {
    pub fn validate_fields(&self) -> AppResult<()> {
        into_result(derived_errors(self))?;
        Ok(())
    }
}

impl FormDefinition for EditPasswordForm {
    const NAME: &'static str = "edit_password";

    fn fields(_rules: &FormRules) -> Vec<FieldSpec> {
        vec![
            password_field("password", "Current password"),
            password_field("new_password", "New password"),
            password_field("confirm_password", "Confirm password"),
            submit("Change password"),
        ]
    }
}

/// Edit name and email of the signed-in user
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct EditProfileForm {
    #[validate(custom(function = "check_required"), custom(function = "check_person_name"))]
    pub first_name: String,
    #[validate(custom(function = "check_required"), custom(function = "check_person_name"))]
    pub surname: String,
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
}

impl EditProfileForm {
    pub async fn validate_with(
        &self,
        lookup: &dyn CatalogLookup,
        rules: &FormRules,
        user_id: i32,
    ) -> AppResult<()> {
        let mut errors = derived_errors(self);
        let email = self.email.trim();
        if let Err(e) = check_email_domain(email, rules) {
            errors.add("email", e);
        } else if lookup.email_registered(email, Some(user_id)).await? {
            errors.add("email", field_error("email_taken", "This email is already registered."));
        }
        into_result(errors)?;
        Ok(())
    }
}

impl FormDefinition for EditProfileForm {
    const NAME: &'static str = "edit_profile";

    fn fields(_rules: &FormRules) -> Vec<FieldSpec> {
        let mut fields: Vec<FieldSpec> = name_fields().into();
        fields.push(email_field());
        fields.push(submit("Save"));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{field_messages, AppError};
    use crate::forms::MockCatalogLookup;

    fn rules() -> FormRules {
        FormRules {
            registration_domain: "tieto.com".to_string(),
            first_publication_year: 1970,
            current_year: 2018,
        }
    }

    fn registration() -> RegistrationForm {
        let password = "65$asdMNB".to_string();
        RegistrationForm {
            email: "asd.qwe@tieto.com".to_string(),
            first_name: "Anna".to_string(),
            surname: "Nowak".to_string(),
            password: password.clone(),
            confirm_pass: password,
        }
    }

    fn lookup(registered: bool) -> MockCatalogLookup {
        let mut lookup = MockCatalogLookup::new();
        lookup
            .expect_email_registered()
            .returning(move |_, _| Ok(registered));
        lookup
    }

    fn invalid_fields(result: AppResult<()>) -> Vec<String> {
        match result {
            Err(AppError::Form(errors)) => field_messages(&errors).into_keys().collect(),
            Ok(()) => Vec::new(),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[tokio::test]
    async fn test_valid_registration() {
        assert!(registration().validate_with(&lookup(false), &rules()).await.is_ok());
    }

    #[tokio::test]
    async fn test_registered_user_rejected() {
        let result = registration().validate_with(&lookup(true), &rules()).await;
        assert_eq!(invalid_fields(result), vec!["email"]);
    }

    #[tokio::test]
    async fn test_foreign_domain_and_mismatched_passwords() {
        let mut lookup = MockCatalogLookup::new();
        lookup.expect_email_registered().never();
        let form = RegistrationForm {
            email: "anna.nowak@gmail.com".to_string(),
            password: "d41d8cd98f00b204".to_string(),
            confirm_pass: "e3b0c44298fc1c14".to_string(),
            ..registration()
        };
        let result = form.validate_with(&lookup, &rules()).await;
        assert_eq!(invalid_fields(result), vec!["confirm_pass", "email", "password"]);
    }

    #[test]
    fn test_login_form() {
        let form = LoginForm {
            email: "anna.nowak@tieto.com".to_string(),
            password: "secret".to_string(),
        };
        assert!(form.validate_fields().is_ok());
        let empty = LoginForm::default();
        assert_eq!(invalid_fields(empty.validate_fields()), vec!["email", "password"]);
    }

    #[test]
    fn test_edit_password_form() {
        let form = EditPasswordForm {
            password: "old".to_string(),
            new_password: "N3w!password".to_string(),
            confirm_password: "N3w!password".to_string(),
        };
        assert!(form.validate_fields().is_ok());

        let mismatch = EditPasswordForm {
            confirm_password: "other".to_string(),
            ..form
        };
        assert_eq!(invalid_fields(mismatch.validate_fields()), vec!["confirm_password"]);
    }

    #[tokio::test]
    async fn test_edit_profile_excludes_own_account() {
        let mut lookup = MockCatalogLookup::new();
        lookup
            .expect_email_registered()
            .withf(|_, exclude| *exclude == Some(5))
            .returning(|_, _| Ok(false));
        let form = EditProfileForm {
            first_name: "Anna".to_string(),
            surname: "Nowak".to_string(),
            email: "AnnaNowak@tieto.com".to_string(),
        };
        assert!(form.validate_with(&lookup, &rules(), 5).await.is_ok());
    }

    #[test]
    fn test_forgot_pass_requires_email() {
        assert!(ForgotPass { email: "anna@tieto.com".to_string() }.validate_fields().is_ok());
        assert!(ForgotPass::default().validate_fields().is_err());
    }

    #[test]
    fn test_registration_schema() {
        let schema = RegistrationForm::form_schema(&rules());
        let names: Vec<&str> = schema.fields.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["email", "first_name", "surname", "password", "confirm_pass", "submit"]);
        assert_eq!(schema.field("password").unwrap().kind, FieldKind::Password);
    }
}
