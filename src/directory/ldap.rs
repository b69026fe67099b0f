//! LDAP-backed directory

use async_trait::async_trait;
use ldap3::{ldap_escape, Ldap, LdapConnAsync, Scope, SearchEntry};

use super::{refine_data, Attributes, Directory, DirectoryEntry, ENTRY_ATTRIBUTES};
use crate::{
    config::DirectoryConfig,
    error::{AppError, AppResult},
};

fn directory_error(context: &str, e: ldap3::LdapError) -> AppError {
    AppError::Directory(format!("{}: {}", context, e))
}

#[derive(Clone)]
pub struct LdapDirectory {
    config: DirectoryConfig,
}

impl LdapDirectory {
    pub fn new(config: DirectoryConfig) -> Self {
        Self { config }
    }

    async fn connect(&self) -> AppResult<Ldap> {
        let (conn, ldap) = LdapConnAsync::new(&self.config.url)
            .await
            .map_err(|e| directory_error("Failed to connect to directory", e))?;
        ldap3::drive!(conn);
        Ok(ldap)
    }

    /// Bind with the service account, if one is configured
    async fn service_bind(&self, ldap: &mut Ldap) -> AppResult<()> {
        if let (Some(dn), Some(password)) = (&self.config.bind_dn, &self.config.bind_password) {
            ldap.simple_bind(dn, password)
                .await
                .and_then(|result| result.success())
                .map_err(|e| directory_error("Service bind failed", e))?;
        }
        Ok(())
    }

    fn user_filter(&self, user: &str) -> String {
        let escaped = ldap_escape(user);
        format!(
            "(&(objectClass=person)(|({}={})(mail={})))",
            self.config.user_attribute, escaped, escaped
        )
    }

    /// Distinguished name and attributes of the first matching object
    async fn find(&self, ldap: &mut Ldap, user: &str) -> AppResult<Option<(String, Attributes)>> {
        let mut attributes: Vec<String> = ENTRY_ATTRIBUTES.iter().map(|a| a.to_string()).collect();
        if !attributes.contains(&self.config.user_attribute) {
            attributes.push(self.config.user_attribute.clone());
        }

        let (entries, _) = ldap
            .search(&self.config.base_dn, Scope::Subtree, &self.user_filter(user), attributes)
            .await
            .and_then(|result| result.success())
            .map_err(|e| directory_error("Directory search failed", e))?;

        Ok(entries.into_iter().next().map(|entry| {
            let entry = SearchEntry::construct(entry);
            (entry.dn, entry.attrs)
        }))
    }

    async fn close(mut ldap: Ldap) {
        if let Err(e) = ldap.unbind().await {
            tracing::debug!("Directory unbind failed: {}", e);
        }
    }
}

#[async_trait]
impl Directory for LdapDirectory {
    async fn bind_user(&self, user: &str, password: &str) -> AppResult<bool> {
        // An empty password would be an anonymous bind
        if password.is_empty() {
            return Ok(false);
        }

        let mut ldap = self.connect().await?;
        self.service_bind(&mut ldap).await?;

        let Some((dn, _)) = self.find(&mut ldap, user).await? else {
            Self::close(ldap).await;
            return Ok(false);
        };

        let bound = ldap
            .simple_bind(&dn, password)
            .await
            .map_err(|e| directory_error("User bind failed", e))?;
        Self::close(ldap).await;

        tracing::debug!("Directory bind for {} returned code {}", user, bound.rc);
        Ok(bound.rc == 0)
    }

    async fn get_object_details(&self, user: &str) -> AppResult<Option<DirectoryEntry>> {
        let mut ldap = self.connect().await?;
        self.service_bind(&mut ldap).await?;
        let found = self.find(&mut ldap, user).await;
        Self::close(ldap).await;

        Ok(found?.map(|(_, attributes)| {
            let mut entry = DirectoryEntry::from_attributes(&attributes);
            entry.user_name = refine_data(&attributes, &self.config.user_attribute);
            entry
        }))
    }
}
