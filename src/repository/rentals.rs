//! Rental logs repository: reservations, borrows and returns.
//!
//! Every change of a log's status also moves its copy to the same status,
//! inside one transaction with the copy row locked.

use chrono::{DateTime, Duration, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        copy::BookStatus,
        rental::{RentalAction, RentalLog, ReservationDetails, RESERVATION_DAYS},
    },
};

const LOG_COLUMNS: &str =
    "id, copy_id, user_id, book_status, reservation_begin, reservation_end, borrow_time, return_time";

#[derive(Clone)]
pub struct RentalsRepository {
    pool: Pool<Postgres>,
}

impl RentalsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<RentalLog> {
        sqlx::query_as::<_, RentalLog>(&format!("SELECT {} FROM rental_logs WHERE id = $1", LOG_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))
    }

    /// Reservations and borrows of a user, newest first
    pub async fn list_for_user(&self, user_id: i32, open_only: bool) -> AppResult<Vec<ReservationDetails>> {
        let rentals = sqlx::query_as::<_, ReservationDetails>(
            r#"
            SELECT r.id, r.copy_id, c.asset_code, i.id AS item_id, i.item_type, i.title,
                   r.book_status, r.reservation_begin, r.reservation_end, r.borrow_time
            FROM rental_logs r
            JOIN copies c ON c.id = r.copy_id
            JOIN library_items i ON i.id = c.library_item_id
            WHERE r.user_id = $1 AND (NOT $2 OR r.book_status <> 'returned')
            ORDER BY r.reservation_begin DESC NULLS LAST, r.id DESC
            "#,
        )
        .bind(user_id)
        .bind(open_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rentals)
    }

    /// Reserve the first available copy of an item
    pub async fn reserve(&self, item_id: i32, user_id: i32) -> AppResult<RentalLog> {
        let mut tx = self.pool.begin().await?;

        // Serializes reserves of one user on one item until commit
        sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
            .bind(user_id)
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

        let already: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM rental_logs r JOIN copies c ON c.id = r.copy_id
                WHERE c.library_item_id = $1 AND r.user_id = $2 AND r.book_status <> 'returned')
            "#,
        )
        .bind(item_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if already {
            return Err(AppError::Conflict(format!(
                "Item {} is already reserved or borrowed by this user",
                item_id
            )));
        }

        let copy_id: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT id FROM copies
            WHERE library_item_id = $1 AND available_status = 'returned'
            ORDER BY asset_code
            LIMIT 1
            FOR UPDATE SKIP LOCKED
            "#,
        )
        .bind(item_id)
        .fetch_optional(&mut *tx)
        .await?;

        let copy_id = copy_id
            .ok_or_else(|| AppError::Unavailable(format!("No copy of item {} is available", item_id)))?;

        sqlx::query("UPDATE copies SET available_status = $1 WHERE id = $2")
            .bind(BookStatus::Reserved.as_str())
            .bind(copy_id)
            .execute(&mut *tx)
            .await?;

        let now = Utc::now();
        let log = sqlx::query_as::<_, RentalLog>(&format!(
            r#"
            INSERT INTO rental_logs (copy_id, user_id, book_status, reservation_begin, reservation_end)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            LOG_COLUMNS
        ))
        .bind(copy_id)
        .bind(user_id)
        .bind(BookStatus::Reserved.as_str())
        .bind(now)
        .bind(now + Duration::days(RESERVATION_DAYS))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(log)
    }

    /// Apply `action` to a log; `owner` restricts it to that user's logs
    pub async fn transition(&self, id: i32, action: RentalAction, owner: Option<i32>) -> AppResult<RentalLog> {
        let mut tx = self.pool.begin().await?;

        let log = sqlx::query_as::<_, RentalLog>(&format!(
            "SELECT {} FROM rental_logs WHERE id = $1 FOR UPDATE",
            LOG_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .filter(|log| owner.map(|user_id| log.user_id == user_id).unwrap_or(true))
        .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))?;

        let next = action.next_status(log.book_status).ok_or_else(|| {
            AppError::Conflict(format!(
                "Cannot {:?} a {} copy",
                action,
                log.book_status.as_str()
            ))
        })?;

        let now = Utc::now();
        let updated = sqlx::query_as::<_, RentalLog>(&format!(
            r#"
            UPDATE rental_logs SET
                book_status = $1,
                borrow_time = CASE WHEN $1 = 'borrowed' THEN $2 ELSE borrow_time END,
                return_time = CASE WHEN $1 = 'returned' THEN $2 ELSE return_time END
            WHERE id = $3
            RETURNING {}
            "#,
            LOG_COLUMNS
        ))
        .bind(next.as_str())
        .bind(now)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE copies SET available_status = $1 WHERE id = $2")
            .bind(next.as_str())
            .bind(log.copy_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Put copies of reservations that ended before `now` back on the shelf
    pub async fn release_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;

        let copy_ids: Vec<i32> = sqlx::query_scalar(
            r#"
            UPDATE rental_logs SET book_status = 'returned', return_time = $1
            WHERE book_status = 'reserved' AND reservation_end < $1
            RETURNING copy_id
            "#,
        )
        .bind(now)
        .fetch_all(&mut *tx)
        .await?;

        if !copy_ids.is_empty() {
            sqlx::query("UPDATE copies SET available_status = 'returned' WHERE id = ANY($1)")
                .bind(&copy_ids)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(copy_ids.len() as u64)
    }
}
