//! Signing in and keeping local accounts in step with the corporate directory

use async_trait::async_trait;

use super::users::verify_password;
use crate::{
    directory::Directory,
    error::{AppError, AppResult},
    models::user::{DirectoryIdentity, NewUser, RoleEnum, User},
    repository::users::UsersRepository,
};

/// Account storage used by sign-in and the directory sync
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn find_by_employee_id(&self, employee_id: &str) -> AppResult<Option<User>>;

    async fn create_user(&self, user: NewUser, role: RoleEnum) -> AppResult<User>;

    async fn update_identity(&self, id: i32, identity: DirectoryIdentity) -> AppResult<User>;

    /// Swap the `user` role for `admin`
    async fn grant_admin(&self, id: i32) -> AppResult<User>;
}

#[async_trait]
impl AccountStore for UsersRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.get_by_email(email).await
    }

    async fn find_by_employee_id(&self, employee_id: &str) -> AppResult<Option<User>> {
        self.get_by_employee_id(employee_id).await
    }

    async fn create_user(&self, user: NewUser, role: RoleEnum) -> AppResult<User> {
        self.create(&user, role).await
    }

    async fn update_identity(&self, id: i32, identity: DirectoryIdentity) -> AppResult<User> {
        UsersRepository::update_identity(self, id, &identity).await
    }

    async fn grant_admin(&self, id: i32) -> AppResult<User> {
        UsersRepository::grant_admin(self, id).await
    }
}

/// Resolve credentials to an active account.
///
/// A local password is tried first. Otherwise the credentials are bound
/// against the directory; employees of `office_location` get their account
/// synced from the entry.
pub async fn sign_in(
    store: &dyn AccountStore,
    directory: &dyn Directory,
    office_location: &str,
    email: &str,
    password: &str,
) -> AppResult<User> {
    let email = email.trim();

    let user = match store.find_by_email(email).await? {
        Some(user) if verify_password(&user, password)? => user,
        _ => sign_in_with_directory(store, directory, office_location, email, password).await?,
    };

    if !user.active {
        return Err(AppError::Authentication("Account is inactive".to_string()));
    }
    Ok(user)
}

async fn sign_in_with_directory(
    store: &dyn AccountStore,
    directory: &dyn Directory,
    office_location: &str,
    email: &str,
    password: &str,
) -> AppResult<User> {
    let invalid = || AppError::Authentication("Invalid email or password".to_string());

    if !directory.bind_user(email, password).await? {
        return Err(invalid());
    }

    let entry = directory.get_object_details(email).await?.ok_or_else(invalid)?;
    if !entry.works_in(office_location) {
        tracing::warn!("Directory login refused for {}: outside {}", email, office_location);
        return Err(AppError::Authorization(format!(
            "Only employees of the {} office can use the library",
            office_location
        )));
    }

    let identity = entry
        .identity()
        .ok_or_else(|| AppError::Directory(format!("Directory entry of {} is incomplete", email)))?;

    sync_directory_user(store, identity).await
}

/// Find the account of a directory employee by employee ID, refreshing
/// mail, first name and surname when they drifted, or create it active with
/// the `user` role.
pub async fn sync_directory_user(store: &dyn AccountStore, identity: DirectoryIdentity) -> AppResult<User> {
    match store.find_by_employee_id(&identity.employee_id).await? {
        Some(user) if identity.matches(&user) => Ok(user),
        Some(user) => {
            tracing::info!(
                "Updating user {} from directory entry of employee {}",
                user.id,
                identity.employee_id
            );
            store.update_identity(user.id, identity).await
        }
        None => {
            tracing::info!(
                "Creating user {} for employee {}",
                identity.email,
                identity.employee_id
            );
            let new_user = NewUser {
                email: identity.email,
                first_name: identity.first_name,
                surname: identity.surname,
                employee_id: Some(identity.employee_id),
                password_hash: None,
                active: true,
            };
            store.create_user(new_user, RoleEnum::User).await
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        directory::{DirectoryEntry, MockDirectory},
        services::users::hash_password,
    };
    use chrono::Utc;

    const PASSWORD: &str = "Library#2018";
    const OFFICE: &str = "Wroclaw";

    pub(crate) fn identity() -> DirectoryIdentity {
        DirectoryIdentity {
            email: "anna.nowak@tieto.com".to_string(),
            first_name: "Anna".to_string(),
            surname: "Nowak".to_string(),
            employee_id: "48213".to_string(),
        }
    }

    pub(crate) fn stored_user(id: i32, identity: &DirectoryIdentity, roles: Vec<RoleEnum>) -> User {
        User {
            id,
            email: identity.email.clone(),
            first_name: identity.first_name.clone(),
            surname: identity.surname.clone(),
            employee_id: Some(identity.employee_id.clone()),
            password_hash: None,
            active: true,
            roles,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_unchanged_user_is_not_written() {
        let mut store = MockAccountStore::new();
        store
            .expect_find_by_employee_id()
            .withf(|employee_id| employee_id == "48213")
            .returning(|_| Ok(Some(stored_user(3, &identity(), vec![RoleEnum::User]))));
        store.expect_update_identity().never();
        store.expect_create_user().never();

        let user = sync_directory_user(&store, identity()).await.unwrap();
        assert_eq!(user.id, 3);
    }

    #[tokio::test]
    async fn test_drifted_surname_is_updated() {
        let mut store = MockAccountStore::new();
        store.expect_find_by_employee_id().returning(|_| {
            let mut old = identity();
            old.surname = "Kowalska".to_string();
            Ok(Some(stored_user(3, &old, vec![RoleEnum::User])))
        });
        store
            .expect_update_identity()
            .withf(|id, identity| *id == 3 && identity.surname == "Nowak")
            .times(1)
            .returning(|id, identity| Ok(stored_user(id, &identity, vec![RoleEnum::User])));

        let user = sync_directory_user(&store, identity()).await.unwrap();
        assert_eq!(user.surname, "Nowak");
    }

    #[tokio::test]
    async fn test_unknown_employee_is_created_active() {
        let mut store = MockAccountStore::new();
        store.expect_find_by_employee_id().returning(|_| Ok(None));
        store
            .expect_create_user()
            .withf(|user, role| user.active && user.password_hash.is_none() && *role == RoleEnum::User)
            .times(1)
            .returning(|_, _| Ok(stored_user(11, &identity(), vec![RoleEnum::User])));

        let user = sync_directory_user(&store, identity()).await.unwrap();
        assert_eq!(user.id, 11);
    }

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

    fn local_user(active: bool) -> User {
        User {
            employee_id: None,
            password_hash: Some(hash_password(PASSWORD).unwrap()),
            active,
            ..stored_user(5, &identity(), vec![RoleEnum::User])
        }
    }

    fn directory_binding(accepted: bool, found: Option<DirectoryEntry>) -> MockDirectory {
        let mut directory = MockDirectory::new();
        directory.expect_bind_user().times(1).returning(move |_, _| Ok(accepted));
        directory
            .expect_get_object_details()
            .returning(move |_| Ok(found.clone()));
        directory
    }

    #[tokio::test]
    async fn test_local_password_skips_directory() {
        let mut store = MockAccountStore::new();
        store
            .expect_find_by_email()
            .withf(|email| email == "anna.nowak@tieto.com")
            .returning(|_| Ok(Some(local_user(true))));
        let mut directory = MockDirectory::new();
        directory.expect_bind_user().never();

        let user = sign_in(&store, &directory, OFFICE, " anna.nowak@tieto.com ", PASSWORD)
            .await
            .unwrap();
        assert_eq!(user.id, 5);
    }

    #[tokio::test]
    async fn test_wrong_local_password_falls_back_to_directory() {
        let mut store = MockAccountStore::new();
        store.expect_find_by_email().returning(|_| Ok(Some(local_user(true))));
        store
            .expect_find_by_employee_id()
            .returning(|_| Ok(Some(stored_user(8, &identity(), vec![RoleEnum::User]))));
        let directory = directory_binding(true, Some(entry(OFFICE)));

        let user = sign_in(&store, &directory, OFFICE, "anna.nowak@tieto.com", "DirectoryPass1!")
            .await
            .unwrap();
        assert_eq!(user.id, 8);
    }

    #[tokio::test]
    async fn test_rejected_bind_is_invalid_credentials() {
        let mut store = MockAccountStore::new();
        store.expect_find_by_email().returning(|_| Ok(None));
        let mut directory = MockDirectory::new();
        directory.expect_bind_user().returning(|_, _| Ok(false));
        directory.expect_get_object_details().never();

        let err = sign_in(&store, &directory, OFFICE, "ghost@tieto.com", "whatever").await.unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_other_office_is_refused() {
        let mut store = MockAccountStore::new();
        store.expect_find_by_email().returning(|_| Ok(None));
        store.expect_find_by_employee_id().never();
        store.expect_create_user().never();
        let directory = directory_binding(true, Some(entry("Espoo")));

        let err = sign_in(&store, &directory, OFFICE, "anna.nowak@tieto.com", PASSWORD)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_inactive_account_is_rejected() {
        let mut store = MockAccountStore::new();
        store.expect_find_by_email().returning(|_| Ok(Some(local_user(false))));
        let mut directory = MockDirectory::new();
        directory.expect_bind_user().never();

        let err = sign_in(&store, &directory, OFFICE, "anna.nowak@tieto.com", PASSWORD)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_first_directory_login_creates_account() {
        let mut store = MockAccountStore::new();
        store.expect_find_by_email().returning(|_| Ok(None));
        store.expect_find_by_employee_id().returning(|_| Ok(None));
        store
            .expect_create_user()
            .withf(|user, role| user.employee_id.as_deref() == Some("48213") && *role == RoleEnum::User)
            .times(1)
            .returning(|_, _| Ok(stored_user(21, &identity(), vec![RoleEnum::User])));
        let directory = directory_binding(true, Some(entry("wroclaw")));

        let user = sign_in(&store, &directory, OFFICE, "anna.nowak@tieto.com", PASSWORD)
            .await
            .unwrap();
        assert_eq!(user.id, 21);
    }
}
