//! Reservation endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::AuthenticatedUser;
use crate::{
    error::AppResult,
    models::{RentalAction, RentalLog, ReservationDetails},
    AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReservationsQuery {
    /// Only reservations still holding a copy (default: true)
    pub open: Option<bool>,
}

/// Reserve an available copy of an item
#[utoipa::path(
    post,
    path = "/items/{id}/reserve",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Item ID")),
    responses(
        (status = 201, description = "Copy reserved", body = RentalLog),
        (status = 409, description = "No copy available or already reserved", body = crate::error::ErrorResponse)
    )
)]
pub async fn reserve(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<(StatusCode, Json<RentalLog>)> {
    let log = state.services.reservations.reserve(id, claims.user_id).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

/// Own reservations and borrows
#[utoipa::path(
    get,
    path = "/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(ReservationsQuery),
    responses(
        (status = 200, description = "Reservations of the user", body = Vec<ReservationDetails>)
    )
)]
pub async fn list_my_reservations(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<ReservationsQuery>,
) -> AppResult<Json<Vec<ReservationDetails>>> {
    let rentals = state
        .services
        .reservations
        .list_for_user(claims.user_id, query.open.unwrap_or(true))
        .await?;
    Ok(Json(rentals))
}

/// Cancel an own reservation
#[utoipa::path(
    post,
    path = "/reservations/{id}/cancel",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation cancelled", body = RentalLog),
        (status = 404, description = "No such reservation of this user", body = crate::error::ErrorResponse),
        (status = 409, description = "Copy already borrowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn cancel(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<RentalLog>> {
    let log = state.services.reservations.cancel(id, claims.user_id).await?;
    Ok(Json(log))
}

/// Hand a reserved copy over to its reader
#[utoipa::path(
    post,
    path = "/reservations/{id}/borrow",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Copy borrowed", body = RentalLog),
        (status = 409, description = "Reservation is not pending", body = crate::error::ErrorResponse)
    )
)]
pub async fn mark_borrowed(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<RentalLog>> {
    claims.require_admin()?;

    let log = state.services.reservations.apply(id, RentalAction::Borrow).await?;
    Ok(Json(log))
}

/// Take a copy back
#[utoipa::path(
    post,
    path = "/reservations/{id}/return",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Copy returned", body = RentalLog),
        (status = 409, description = "Copy already returned", body = crate::error::ErrorResponse)
    )
)]
pub async fn mark_returned(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<RentalLog>> {
    claims.require_admin()?;

    let log = state.services.reservations.apply(id, RentalAction::Return).await?;
    Ok(Json(log))
}
