//! API handlers for the library catalog REST endpoints

pub mod admin;
pub mod auth;
pub mod health;
pub mod items;
pub mod openapi;
pub mod pages;
pub mod reservations;
pub mod users;
pub mod wishlist;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// One-shot message shown on the next page, with its category (`ok`, `error`)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Flash {
    pub category: String,
    pub message: String,
}

/// Outcome of a submitted form: a flash message and where to go next
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FlashRedirect {
    pub flash: Flash,
    pub redirect: String,
}

impl FlashRedirect {
    pub fn ok(message: impl Into<String>, redirect: impl Into<String>) -> Self {
        Self {
            flash: Flash {
                category: "ok".to_string(),
                message: message.into(),
            },
            redirect: redirect.into(),
        }
    }
}
