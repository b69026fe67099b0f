//! Authentication endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use super::{AuthenticatedUser, FlashRedirect};
use crate::{
    error::AppResult,
    forms::{ForgotPass, LoginForm, ResetPasswordForm},
    models::User,
    AppState,
};

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: u64,
    pub user: User,
}

/// Sign in with a local or directory password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginForm,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse),
        (status = 403, description = "Employee outside the library office", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) = state.services.users.login(form).await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.config.auth.jwt_expiration_hours * 3600,
        user,
    }))
}

/// Current user
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Signed-in user", body = User),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<User>> {
    let user = state.services.users.get_by_id(claims.user_id).await?;
    Ok(Json(user))
}

/// Request a password reset token by email
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    tag = "auth",
    request_body = ForgotPass,
    responses(
        (status = 200, description = "Token sent if the address is registered", body = FlashRedirect),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(form): Json<ForgotPass>,
) -> AppResult<Json<FlashRedirect>> {
    state.services.users.forgot_password(form).await?;
    Ok(Json(FlashRedirect::ok(
        "Check your mailbox for the password reset token",
        "/login",
    )))
}

/// Set a new password with a reset token
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    tag = "auth",
    request_body = ResetPasswordForm,
    responses(
        (status = 200, description = "Password changed", body = FlashRedirect),
        (status = 401, description = "Invalid or expired token", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(form): Json<ResetPasswordForm>,
) -> AppResult<Json<FlashRedirect>> {
    state.services.users.reset_password(form).await?;
    Ok(Json(FlashRedirect::ok("Your password has been changed", "/login")))
}
