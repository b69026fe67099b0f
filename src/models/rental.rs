//! Rental log (reservations and borrows)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::{copy::BookStatus, item::ItemType};

/// Reservation length before an unclaimed copy goes back on the shelf
pub const RESERVATION_DAYS: i64 = 2;

/// One reservation/borrow cycle of a copy
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RentalLog {
    pub id: i32,
    pub copy_id: i32,
    pub user_id: i32,
    #[sqlx(try_from = "String")]
    pub book_status: BookStatus,
    pub reservation_begin: Option<DateTime<Utc>>,
    pub reservation_end: Option<DateTime<Utc>>,
    pub borrow_time: Option<DateTime<Utc>>,
    pub return_time: Option<DateTime<Utc>>,
}

/// Staff or patron action on an open rental
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RentalAction {
    Cancel,
    Borrow,
    Return,
}

impl RentalAction {
    /// Status reached from `current`, `None` when the action does not apply
    pub fn next_status(&self, current: BookStatus) -> Option<BookStatus> {
        match (self, current) {
            (RentalAction::Cancel, BookStatus::Reserved) => Some(BookStatus::Returned),
            (RentalAction::Borrow, BookStatus::Reserved) => Some(BookStatus::Borrowed),
            (RentalAction::Return, BookStatus::Reserved | BookStatus::Borrowed) => {
                Some(BookStatus::Returned)
            }
            _ => None,
        }
    }
}

/// Reservation as listed to its owner
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReservationDetails {
    pub id: i32,
    pub copy_id: i32,
    pub asset_code: String,
    pub item_id: i32,
    #[sqlx(try_from = "String")]
    pub item_type: ItemType,
    pub title: String,
    #[sqlx(try_from = "String")]
    pub book_status: BookStatus,
    pub reservation_begin: Option<DateTime<Utc>>,
    pub reservation_end: Option<DateTime<Utc>>,
    pub borrow_time: Option<DateTime<Utc>>,
}
