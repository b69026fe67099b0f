//! Business logic services

pub mod accounts;
pub mod admin;
pub mod catalog;
pub mod contact;
pub mod email;
pub mod redis;
pub mod reservations;
pub mod users;
pub mod wishlist;

use std::sync::Arc;

use crate::{config::AppConfig, directory::Directory, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub reservations: reservations::ReservationsService,
    pub wishlist: wishlist::WishlistService,
    pub admin: admin::AdminService,
    pub contact: contact::ContactService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        config: &AppConfig,
        directory: Arc<dyn Directory>,
        redis: redis::RedisService,
        mailer: Arc<dyn email::Mailer>,
    ) -> Self {
        let office = config.directory.office_location.clone();

        Self {
            users: users::UsersService::new(
                repository.clone(),
                config.auth.clone(),
                config.library.clone(),
                directory.clone(),
                office.clone(),
                redis,
                mailer.clone(),
            ),
            catalog: catalog::CatalogService::new(repository.clone(), config.library.clone()),
            reservations: reservations::ReservationsService::new(repository.clone()),
            wishlist: wishlist::WishlistService::new(repository.clone(), config.library.clone()),
            admin: admin::AdminService::new(Arc::new(repository.users), directory, office),
            contact: contact::ContactService::new(mailer, config.email.contact_mailbox().to_string()),
        }
    }
}
