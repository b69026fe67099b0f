//! Granting admin privileges to directory employees.
//!
//! Each requested address is looked up in the directory; the matching local
//! account is synced from the entry (or created) and its `user` role is
//! swapped for `admin`. Employees outside the office are still promoted, the
//! report carries a warning for them.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use super::accounts::{sync_directory_user, AccountStore};
use crate::{directory::Directory, error::AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PromotionStatus {
    Granted,
    NotInDirectory,
    /// Entry lacks mail, names or employee ID
    IncompleteEntry,
}

/// Result of promoting one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PromotionReport {
    pub email: String,
    pub status: PromotionStatus,
    pub user_id: Option<i32>,
    pub warnings: Vec<String>,
    pub message: String,
}

#[derive(Clone)]
pub struct AdminService {
    store: Arc<dyn AccountStore>,
    directory: Arc<dyn Directory>,
    office_location: String,
}

impl AdminService {
    pub fn new(store: Arc<dyn AccountStore>, directory: Arc<dyn Directory>, office_location: String) -> Self {
        Self {
            store,
            directory,
            office_location,
        }
    }

    /// Promote every address in turn; a storage or directory failure stops the run
    pub async fn promote(&self, emails: &[String]) -> AppResult<Vec<PromotionReport>> {
        let mut reports = Vec::with_capacity(emails.len());
        for email in emails {
            let report = self.promote_one(email.trim()).await?;
            match report.status {
                PromotionStatus::Granted => tracing::info!("{}", report.message),
                _ => tracing::warn!("{}", report.message),
            }
            for warning in &report.warnings {
                tracing::warn!("{}", warning);
            }
            reports.push(report);
        }
        Ok(reports)
    }

    async fn promote_one(&self, email: &str) -> AppResult<PromotionReport> {
        let Some(entry) = self.directory.get_object_details(email).await? else {
            return Ok(PromotionReport {
                email: email.to_string(),
                status: PromotionStatus::NotInDirectory,
                user_id: None,
                warnings: Vec::new(),
                message: format!("Error - employee {} not present in directory", email),
            });
        };

        let mut warnings = Vec::new();
        if !entry.works_in(&self.office_location) {
            warnings.push(format!(
                "Error - employee {} does not work in {}",
                email, self.office_location
            ));
        }

        let Some(identity) = entry.identity() else {
            return Ok(PromotionReport {
                email: email.to_string(),
                status: PromotionStatus::IncompleteEntry,
                user_id: None,
                warnings,
                message: format!("Error - directory entry of employee {} is incomplete", email),
            });
        };

        let user = sync_directory_user(self.store.as_ref(), identity).await?;
        let user = self.store.grant_admin(user.id).await?;

        Ok(PromotionReport {
            email: email.to_string(),
            status: PromotionStatus::Granted,
            user_id: Some(user.id),
            warnings,
            message: format!("Employee {} granted with admin privileges", email),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        directory::{DirectoryEntry, MockDirectory},
        models::RoleEnum,
        services::accounts::{
            tests::{identity, stored_user},
            MockAccountStore,
        },
    };

    fn entry(location: &str) -> DirectoryEntry {
        let identity = identity();
        DirectoryEntry {
            user_name: Some("nowakann".to_string()),
            mail: Some(identity.email),
            given_name: Some(identity.first_name),
            sn: Some(identity.surname),
            employee_id: Some(identity.employee_id),
            location: Some(location.to_string()),
        }
    }

    fn directory_with(found: Option<DirectoryEntry>) -> MockDirectory {
        let mut directory = MockDirectory::new();
        directory
            .expect_get_object_details()
            .returning(move |_| Ok(found.clone()));
        directory
    }

    fn service(store: MockAccountStore, directory: MockDirectory) -> AdminService {
        AdminService::new(Arc::new(store), Arc::new(directory), "Wroclaw".to_string())
    }

    #[tokio::test]
    async fn test_missing_employee_is_reported() {
        let mut store = MockAccountStore::new();
        store.expect_grant_admin().never();

        let reports = service(store, directory_with(None))
            .promote(&["ghost@tieto.com".to_string()])
            .await
            .unwrap();

        assert_eq!(reports[0].status, PromotionStatus::NotInDirectory);
        assert!(reports[0].message.contains("not present in directory"));
    }

    #[tokio::test]
    async fn test_existing_user_is_promoted() {
        let mut store = MockAccountStore::new();
        store
            .expect_find_by_employee_id()
            .returning(|_| Ok(Some(stored_user(4, &identity(), vec![RoleEnum::User]))));
        store
            .expect_grant_admin()
            .withf(|id| *id == 4)
            .times(1)
            .returning(|id| Ok(stored_user(id, &identity(), vec![RoleEnum::Admin])));

        let reports = service(store, directory_with(Some(entry("Wroclaw"))))
            .promote(&["anna.nowak@tieto.com".to_string()])
            .await
            .unwrap();

        assert_eq!(reports[0].status, PromotionStatus::Granted);
        assert_eq!(reports[0].user_id, Some(4));
        assert!(reports[0].warnings.is_empty());
    }

    #[tokio::test]
    async fn test_employee_outside_office_is_promoted_with_warning() {
        let mut store = MockAccountStore::new();
        store.expect_find_by_employee_id().returning(|_| Ok(None));
        store
            .expect_create_user()
            .times(1)
            .returning(|_, _| Ok(stored_user(9, &identity(), vec![RoleEnum::User])));
        store
            .expect_grant_admin()
            .times(1)
            .returning(|id| Ok(stored_user(id, &identity(), vec![RoleEnum::Admin])));

        let reports = service(store, directory_with(Some(entry("Tampere"))))
            .promote(&["anna.nowak@tieto.com".to_string()])
            .await
            .unwrap();

        assert_eq!(reports[0].status, PromotionStatus::Granted);
        assert_eq!(reports[0].warnings.len(), 1);
        assert!(reports[0].warnings[0].contains("Wroclaw"));
    }

    #[tokio::test]
    async fn test_incomplete_entry_is_skipped() {
        let mut incomplete = entry("Wroclaw");
        incomplete.employee_id = None;
        let mut store = MockAccountStore::new();
        store.expect_find_by_employee_id().never();
        store.expect_grant_admin().never();

        let reports = service(store, directory_with(Some(incomplete)))
            .promote(&["anna.nowak@tieto.com".to_string()])
            .await
            .unwrap();

        assert_eq!(reports[0].status, PromotionStatus::IncompleteEntry);
    }
}
