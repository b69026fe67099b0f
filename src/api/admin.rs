//! Administration endpoints

use axum::{extract::State, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use super::AuthenticatedUser;
use crate::{
    error::{AppError, AppResult},
    services::admin::PromotionReport,
    AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct PromoteRequest {
    /// Directory mail addresses of the employees to promote
    pub emails: Vec<String>,
}

/// Grant admin privileges to directory employees
#[utoipa::path(
    post,
    path = "/admin/promote",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = PromoteRequest,
    responses(
        (status = 200, description = "One report per address", body = Vec<PromotionReport>),
        (status = 403, description = "Not an administrator", body = crate::error::ErrorResponse),
        (status = 502, description = "Directory failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn promote_admins(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<PromoteRequest>,
) -> AppResult<Json<Vec<PromotionReport>>> {
    claims.require_admin()?;

    if request.emails.is_empty() {
        return Err(AppError::Validation("No email given".to_string()));
    }

    tracing::info!("User {} promotes {:?}", claims.user_id, request.emails);
    let reports = state.services.admin.promote(&request.emails).await?;
    Ok(Json(reports))
}
