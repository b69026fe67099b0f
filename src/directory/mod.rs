//! Corporate directory (LDAP) access.
//!
//! Employees authenticate against the directory and admin accounts are
//! provisioned from it. [`Directory`] is the seam: [`ldap::LdapDirectory`]
//! talks to a real server, [`StaticDirectory`] serves a fixed set of entries
//! for development and tests.

pub mod ldap;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::{error::AppResult, models::user::DirectoryIdentity};

pub use ldap::LdapDirectory;

/// Attributes requested from the directory
pub const ENTRY_ATTRIBUTES: [&str; 6] = ["sAMAccountName", "mail", "givenName", "sn", "employeeID", "l"];

/// Raw attribute map of a directory object
pub type Attributes = HashMap<String, Vec<String>>;

/// First value of an attribute, trimmed; `None` when missing or blank
pub fn refine_data(attributes: &Attributes, name: &str) -> Option<String> {
    attributes
        .get(name)
        .and_then(|values| values.first())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Employee record read from the directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub user_name: Option<String>,
    pub mail: Option<String>,
    pub given_name: Option<String>,
    pub sn: Option<String>,
    pub employee_id: Option<String>,
    /// Office city (`l` attribute)
    pub location: Option<String>,
}

impl DirectoryEntry {
    pub fn from_attributes(attributes: &Attributes) -> Self {
        Self {
            user_name: refine_data(attributes, "sAMAccountName"),
            mail: refine_data(attributes, "mail"),
            given_name: refine_data(attributes, "givenName"),
            sn: refine_data(attributes, "sn"),
            employee_id: refine_data(attributes, "employeeID"),
            location: refine_data(attributes, "l"),
        }
    }

    pub fn works_in(&self, office: &str) -> bool {
        self.location
            .as_deref()
            .map(|l| l.eq_ignore_ascii_case(office))
            .unwrap_or(false)
    }

    /// Identity fields, when the entry carries all of them
    pub fn identity(&self) -> Option<DirectoryIdentity> {
        Some(DirectoryIdentity {
            email: self.mail.clone()?,
            first_name: self.given_name.clone()?,
            surname: self.sn.clone()?,
            employee_id: self.employee_id.clone()?,
        })
    }

    fn answers_to(&self, user: &str) -> bool {
        let matches = |value: &Option<String>| {
            value
                .as_deref()
                .map(|v| v.eq_ignore_ascii_case(user))
                .unwrap_or(false)
        };
        matches(&self.user_name) || matches(&self.mail)
    }
}

/// Read access to the corporate directory
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Directory: Send + Sync {
    /// Check credentials; `user` is an account name or a mail address
    async fn bind_user(&self, user: &str, password: &str) -> AppResult<bool>;

    /// Look an employee up by account name or mail address
    async fn get_object_details(&self, user: &str) -> AppResult<Option<DirectoryEntry>>;
}

/// Entry plus password served by [`StaticDirectory`]
#[derive(Debug, Clone)]
pub struct StaticAccount {
    pub entry: DirectoryEntry,
    pub password: String,
}

/// Fixed in-memory directory
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    accounts: Vec<StaticAccount>,
}

impl StaticDirectory {
    pub fn new(accounts: Vec<StaticAccount>) -> Self {
        Self { accounts }
    }

    pub fn with_account(mut self, entry: DirectoryEntry, password: impl Into<String>) -> Self {
        self.accounts.push(StaticAccount {
            entry,
            password: password.into(),
        });
        self
    }

    fn find(&self, user: &str) -> Option<&StaticAccount> {
        self.accounts.iter().find(|a| a.entry.answers_to(user))
    }
}

#[async_trait]
impl Directory for StaticDirectory {
    async fn bind_user(&self, user: &str, password: &str) -> AppResult<bool> {
        Ok(self
            .find(user)
            .map(|account| account.password == password)
            .unwrap_or(false))
    }

    async fn get_object_details(&self, user: &str) -> AppResult<Option<DirectoryEntry>> {
        Ok(self.find(user).map(|account| account.entry.clone()))
    }
}
