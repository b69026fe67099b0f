//! Wishlist endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::AuthenticatedUser;
use crate::{error::AppResult, forms::WishlistForm, models::WishListItem, AppState};

/// Wishlist, most liked first
#[utoipa::path(
    get,
    path = "/wishlist",
    tag = "wishlist",
    responses((status = 200, description = "Wishlist items", body = Vec<WishListItem>))
)]
pub async fn list_wishlist(State(state): State<AppState>) -> AppResult<Json<Vec<WishListItem>>> {
    Ok(Json(state.services.wishlist.list().await?))
}

/// Propose a title
#[utoipa::path(
    post,
    path = "/wishlist",
    tag = "wishlist",
    security(("bearer_auth" = [])),
    request_body = WishlistForm,
    responses(
        (status = 201, description = "Wishlist item added", body = WishListItem),
        (status = 403, description = "Not an administrator", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn add_wish(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(form): Json<WishlistForm>,
) -> AppResult<(StatusCode, Json<WishListItem>)> {
    claims.require_admin()?;

    let item = state.services.wishlist.add(form).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Like a wishlist item
#[utoipa::path(
    post,
    path = "/wishlist/{id}/like",
    tag = "wishlist",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Wishlist item ID")),
    responses(
        (status = 200, description = "Like counted", body = WishListItem),
        (status = 404, description = "Wishlist item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn like_wish(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<WishListItem>> {
    Ok(Json(state.services.wishlist.like(id).await?))
}

/// Remove a wishlist item
#[utoipa::path(
    delete,
    path = "/wishlist/{id}",
    tag = "wishlist",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Wishlist item ID")),
    responses(
        (status = 204, description = "Wishlist item deleted"),
        (status = 404, description = "Wishlist item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_wish(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.wishlist.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
