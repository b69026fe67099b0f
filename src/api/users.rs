//! Profile endpoints of the signed-in user

use axum::{extract::State, Json};

use super::{AuthenticatedUser, FlashRedirect};
use crate::{
    error::AppResult,
    forms::{EditPasswordForm, EditProfileForm},
    models::User,
    AppState,
};

/// Update own name and email
#[utoipa::path(
    put,
    path = "/profile",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = EditProfileForm,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_my_profile(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(form): Json<EditProfileForm>,
) -> AppResult<Json<User>> {
    let user = state.services.users.update_profile(claims.user_id, form).await?;
    Ok(Json(user))
}

/// Change own password
#[utoipa::path(
    put,
    path = "/profile/password",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = EditPasswordForm,
    responses(
        (status = 200, description = "Password changed", body = FlashRedirect),
        (status = 401, description = "Wrong current password", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn change_my_password(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(form): Json<EditPasswordForm>,
) -> AppResult<Json<FlashRedirect>> {
    state.services.users.change_password(claims.user_id, form).await?;
    Ok(Json(FlashRedirect::ok("Your password has been changed", "/profile")))
}
