//! Item (catalog) and copy endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use super::AuthenticatedUser;
use crate::{
    error::AppResult,
    forms::{AddNewItemBookForm, AddNewItemMagazineForm, BookForm, CopyAddForm, CopyEditForm, MagazineForm},
    models::{
        item::{ItemQuery, ItemShort, LibraryItem},
        ItemCopy,
    },
    AppState,
};

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// List of items
    pub items: Vec<T>,
    /// Total number of items
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Items per page
    pub per_page: i64,
}

/// Search items by title, author, tag or ISBN
#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    params(ItemQuery),
    responses(
        (status = 200, description = "Matching items", body = PaginatedResponse<ItemShort>),
        (status = 422, description = "Search text is blank or too long", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ItemQuery>,
) -> AppResult<Json<PaginatedResponse<ItemShort>>> {
    let (items, total) = state.services.catalog.search_items(&query).await?;

    Ok(Json(PaginatedResponse {
        items,
        total,
        page: query.page(),
        per_page: query.per_page(),
    }))
}

/// Get item details by ID
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "items",
    params(("id" = i32, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item details", body = LibraryItem),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_item(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<LibraryItem>> {
    let item = state.services.catalog.get_item(id).await?;
    Ok(Json(item))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/items/books",
    tag = "items",
    security(("bearer_auth" = [])),
    request_body = AddNewItemBookForm,
    responses(
        (status = 201, description = "Book created", body = LibraryItem),
        (status = 403, description = "Not an administrator", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(form): Json<AddNewItemBookForm>,
) -> AppResult<(StatusCode, Json<LibraryItem>)> {
    claims.require_admin()?;

    let created = state.services.catalog.create_book(form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Create a magazine
#[utoipa::path(
    post,
    path = "/items/magazines",
    tag = "items",
    security(("bearer_auth" = [])),
    request_body = AddNewItemMagazineForm,
    responses(
        (status = 201, description = "Magazine created", body = LibraryItem),
        (status = 403, description = "Not an administrator", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_magazine(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(form): Json<AddNewItemMagazineForm>,
) -> AppResult<(StatusCode, Json<LibraryItem>)> {
    claims.require_admin()?;

    let created = state.services.catalog.create_magazine(form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/items/books/{id}",
    tag = "items",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Item ID")),
    request_body = BookForm,
    responses(
        (status = 200, description = "Book updated", body = LibraryItem),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(form): Json<BookForm>,
) -> AppResult<Json<LibraryItem>> {
    claims.require_admin()?;

    let updated = state.services.catalog.update_book(id, form).await?;
    Ok(Json(updated))
}

/// Update a magazine
#[utoipa::path(
    put,
    path = "/items/magazines/{id}",
    tag = "items",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Item ID")),
    request_body = MagazineForm,
    responses(
        (status = 200, description = "Magazine updated", body = LibraryItem),
        (status = 404, description = "Magazine not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_magazine(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(form): Json<MagazineForm>,
) -> AppResult<Json<LibraryItem>> {
    claims.require_admin()?;

    let updated = state.services.catalog.update_magazine(id, form).await?;
    Ok(Json(updated))
}

/// Delete an item and its copies
#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "items",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Item ID")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse),
        (status = 409, description = "A copy is reserved or borrowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.catalog.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List copies of an item
#[utoipa::path(
    get,
    path = "/items/{id}/copies",
    tag = "copies",
    params(("id" = i32, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Copies of the item", body = Vec<ItemCopy>),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_copies(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<Vec<ItemCopy>>> {
    let copies = state.services.catalog.list_copies(id).await?;
    Ok(Json(copies))
}

/// Add a copy to an item
#[utoipa::path(
    post,
    path = "/items/{id}/copies",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Item ID")),
    request_body = CopyAddForm,
    responses(
        (status = 201, description = "Copy added", body = ItemCopy),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn add_copy(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(form): Json<CopyAddForm>,
) -> AppResult<(StatusCode, Json<ItemCopy>)> {
    claims.require_admin()?;

    let copy = state.services.catalog.add_copy(id, form).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// Edit a copy
#[utoipa::path(
    put,
    path = "/copies/{id}",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Copy ID")),
    request_body = CopyEditForm,
    responses(
        (status = 200, description = "Copy updated", body = ItemCopy),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn edit_copy(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(form): Json<CopyEditForm>,
) -> AppResult<Json<ItemCopy>> {
    claims.require_admin()?;

    let copy = state.services.catalog.edit_copy(id, form).await?;
    Ok(Json(copy))
}

/// Delete a copy that is on the shelf
#[utoipa::path(
    delete,
    path = "/copies/{id}",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Copy ID")),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Copy is reserved or borrowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_copy(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.catalog.delete_copy(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
