//! LDAP / Active Directory client
//!
//! Holds one bound connection for the whole run. Searches are subtree-scoped
//! with no size or time limit.

use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Scope, SearchEntry, SearchOptions};
use tracing::{debug, info, instrument};

use osluc_core::{DerefAliases, DirectoryClient, DirectoryEntry, OslucError, Result, SearchRequest};

use crate::config::SyncConfig;

/// Bound `ldap3` connection
pub struct LdapDirectory {
    ldap: Ldap,
    url: String,
}

impl LdapDirectory {
    /// Resolve the bind password, connect and bind with the service account.
    #[instrument(skip(config), fields(url = %config.url, bind_dn = %config.bind_dn))]
    pub async fn connect(config: &SyncConfig) -> Result<Self> {
        let bind_password = config.bind_password.resolve()?;

        let settings = LdapConnSettings::new().set_no_tls_verify(config.insecure);

        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &config.url)
            .await
            .map_err(|e| OslucError::directory(format!("Failed to connect to LDAP: {}", e)))?;

        ldap3::drive!(conn);

        ldap.simple_bind(&config.bind_dn, &bind_password)
            .await
            .map_err(|e| OslucError::directory(format!("Failed to bind to LDAP: {}", e)))?
            .success()
            .map_err(|e| OslucError::directory(format!("Failed to bind to LDAP: {}", e)))?;

        info!("Successfully bound to LDAP");

        Ok(Self {
            ldap,
            url: config.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DirectoryClient for LdapDirectory {
    #[instrument(skip(self, request), fields(url = %self.url, filter = %request.filter))]
    async fn search(&mut self, request: &SearchRequest) -> Result<Vec<DirectoryEntry>> {
        let options = SearchOptions::new().deref(ldap_deref(request.deref_aliases));

        let (rs, _result) = self
            .ldap
            .with_search_options(options)
            .search(
                &request.base_dn,
                Scope::Subtree,
                &request.filter,
                request.attributes.clone(),
            )
            .await
            .map_err(|e| OslucError::directory(format!("LDAP search failed: {}", e)))?
            .success()
            .map_err(|e| OslucError::directory(format!("LDAP search failed: {}", e)))?;

        let entries: Vec<DirectoryEntry> = rs
            .into_iter()
            .map(|entry| {
                let se = SearchEntry::construct(entry);
                DirectoryEntry {
                    dn: se.dn,
                    attrs: se.attrs,
                }
            })
            .collect();

        debug!(found = entries.len(), "LDAP search returned entries");
        Ok(entries)
    }

    async fn close(&mut self) -> Result<()> {
        self.ldap
            .unbind()
            .await
            .map_err(|e| OslucError::directory(format!("LDAP unbind failed: {}", e)))?;
        debug!(url = %self.url, "LDAP connection closed");
        Ok(())
    }
}

fn ldap_deref(policy: DerefAliases) -> ldap3::DerefAliases {
    match policy {
        DerefAliases::Always => ldap3::DerefAliases::Always,
        DerefAliases::Never => ldap3::DerefAliases::Never,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deref_mapping() {
        assert!(matches!(
            ldap_deref(DerefAliases::Always),
            ldap3::DerefAliases::Always
        ));
        assert!(matches!(
            ldap_deref(DerefAliases::Never),
            ldap3::DerefAliases::Never
        ));
    }

    #[tokio::test]
    async fn test_connect_fails_on_unreadable_password_file() {
        let config = SyncConfig {
            url: "ldap://127.0.0.1:1".to_string(),
            bind_dn: "cn=svc,dc=example,dc=com".to_string(),
            bind_password: crate::PasswordSource::File("/nonexistent/osluc/password".into()),
            insecure: false,
            augmented_active_directory: crate::ActiveDirectoryQuery {
                users_query: crate::UsersQuery {
                    base_dn: "dc=example,dc=com".to_string(),
                    filter: String::new(),
                    deref_aliases: DerefAliases::Never,
                },
                user_name_attributes: vec!["sAMAccountName".to_string()],
            },
        };

        let err = LdapDirectory::connect(&config).await.err().unwrap();
        assert!(matches!(err, OslucError::Config { .. }));
        assert!(err.is_fatal());
    }
}
