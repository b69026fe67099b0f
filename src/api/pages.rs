//! Page endpoints: page title plus the form the page renders

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use super::FlashRedirect;
use crate::{
    error::{AppError, AppResult},
    forms::{
        schema_by_name, ContactForm, FormDefinition, FormRules, FormSchema, LoginForm, RegistrationForm,
        SearchForm,
    },
    AppState,
};

#[derive(Serialize, ToSchema)]
pub struct PageResponse {
    pub title: String,
    /// Fields of the page form, in display order
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub form: Option<FormSchema>,
}

impl PageResponse {
    fn new(title: &str, form: Option<FormSchema>) -> Json<Self> {
        Json(Self {
            title: title.to_string(),
            form,
        })
    }
}

fn rules(state: &AppState) -> FormRules {
    FormRules::from_config(&state.config.library)
}

/// Home page
#[utoipa::path(
    get,
    path = "/",
    tag = "pages",
    responses((status = 200, description = "Home page", body = PageResponse))
)]
pub async fn index() -> Json<PageResponse> {
    PageResponse::new("Welcome!", None)
}

/// Sign in page
#[utoipa::path(
    get,
    path = "/login",
    tag = "pages",
    responses((status = 200, description = "Sign in form", body = PageResponse))
)]
pub async fn login_page(State(state): State<AppState>) -> Json<PageResponse> {
    PageResponse::new("Sign In", Some(LoginForm::form_schema(&rules(&state))))
}

/// Search page
#[utoipa::path(
    get,
    path = "/search",
    tag = "pages",
    responses((status = 200, description = "Search form", body = PageResponse))
)]
pub async fn search_page(State(state): State<AppState>) -> Json<PageResponse> {
    PageResponse::new("Search", Some(SearchForm::form_schema(&rules(&state))))
}

/// Contact page
#[utoipa::path(
    get,
    path = "/contact",
    tag = "pages",
    responses((status = 200, description = "Contact form", body = PageResponse))
)]
pub async fn contact_page(State(state): State<AppState>) -> Json<PageResponse> {
    PageResponse::new("Contact", Some(ContactForm::form_schema(&rules(&state))))
}

/// Send a contact message
#[utoipa::path(
    post,
    path = "/contact",
    tag = "pages",
    request_body = ContactForm,
    responses(
        (status = 200, description = "Message sent", body = FlashRedirect),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 502, description = "Mail server failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn contact_submit(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> AppResult<Json<FlashRedirect>> {
    state.services.contact.send(form).await?;
    Ok(Json(FlashRedirect::ok("Message send", "/contact")))
}

/// Registration page
#[utoipa::path(
    get,
    path = "/register",
    tag = "pages",
    responses((status = 200, description = "Registration form", body = PageResponse))
)]
pub async fn register_page(State(state): State<AppState>) -> Json<PageResponse> {
    PageResponse::new("Register", Some(RegistrationForm::form_schema(&rules(&state))))
}

/// Create an account
#[utoipa::path(
    post,
    path = "/register",
    tag = "pages",
    request_body = RegistrationForm,
    responses(
        (status = 201, description = "Account created", body = FlashRedirect),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn register_submit(
    State(state): State<AppState>,
    Json(form): Json<RegistrationForm>,
) -> AppResult<(StatusCode, Json<FlashRedirect>)> {
    state.services.users.register(form).await?;
    Ok((
        StatusCode::CREATED,
        Json(FlashRedirect::ok("Account created, you can sign in now", "/login")),
    ))
}

/// Any form by name
#[utoipa::path(
    get,
    path = "/forms/{name}",
    tag = "pages",
    params(("name" = String, Path, description = "Form name, e.g. `add_book`")),
    responses(
        (status = 200, description = "Form fields", body = Object),
        (status = 404, description = "Unknown form", body = crate::error::ErrorResponse)
    )
)]
pub async fn form_schema(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<FormSchema>> {
    schema_by_name(&name, &rules(&state))
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Form {} not found", name)))
}
