//! Reservations and borrows

use chrono::Utc;

use crate::{
    error::AppResult,
    models::{RentalAction, RentalLog, ReservationDetails},
    repository::Repository,
};

#[derive(Clone)]
pub struct ReservationsService {
    repository: Repository,
}

impl ReservationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Reserve an available copy of an item for a user
    pub async fn reserve(&self, item_id: i32, user_id: i32) -> AppResult<RentalLog> {
        let log = self.repository.rentals.reserve(item_id, user_id).await?;
        tracing::info!(
            "User {} reserved copy {} of item {} until {:?}",
            user_id,
            log.copy_id,
            item_id,
            log.reservation_end
        );
        Ok(log)
    }

    pub async fn list_for_user(&self, user_id: i32, open_only: bool) -> AppResult<Vec<ReservationDetails>> {
        self.repository.rentals.list_for_user(user_id, open_only).await
    }

    /// Cancel one of the user's own reservations
    pub async fn cancel(&self, id: i32, user_id: i32) -> AppResult<RentalLog> {
        self.repository
            .rentals
            .transition(id, RentalAction::Cancel, Some(user_id))
            .await
    }

    /// Staff action on any reservation
    pub async fn apply(&self, id: i32, action: RentalAction) -> AppResult<RentalLog> {
        let log = self.repository.rentals.transition(id, action, None).await?;
        tracing::info!("Rental {} is now {}", id, log.book_status.as_str());
        Ok(log)
    }

    /// Put copies of lapsed reservations back on the shelf
    pub async fn release_expired(&self) -> AppResult<u64> {
        let released = self.repository.rentals.release_expired(Utc::now()).await?;
        if released > 0 {
            tracing::info!("Released {} expired reservations", released);
        }
        Ok(released)
    }
}
