//! Reconciliation driver
//!
//! The driver:
//! - Lists every local user once
//! - Keeps only users with exactly one identity carrying the configured prefix
//! - Looks each remaining user up in the directory
//! - Deletes identity, then user, for accounts missing from the directory
//!
//! Deletes only happen in confirm mode. A user is never deleted unless its
//! identity delete succeeded first; nothing is rolled back.

use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use osluc_core::{DirectoryClient, IdentityRef, IdentityStore, Result, User};
use osluc_directory::{evaluate, search_user, ActiveDirectoryQuery};

use crate::report::{RunReport, SkipReason, UserOutcome};

/// Prefix that matches no real identity provider
pub const DEFAULT_IDENTITY_PREFIX: &str = "notset";

/// Run options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileSettings {
    /// Plain string prefix an identity must start with to be considered
    pub identity_prefix: String,
    /// Execute deletions instead of only logging them
    pub confirm: bool,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            identity_prefix: DEFAULT_IDENTITY_PREFIX.to_string(),
            confirm: false,
        }
    }
}

/// Reconciles local users against the directory
pub struct Reconciler<S>
where
    S: IdentityStore,
{
    store: Arc<S>,
    query: ActiveDirectoryQuery,
    settings: ReconcileSettings,
}

impl<S> Reconciler<S>
where
    S: IdentityStore + 'static,
{
    pub fn new(store: Arc<S>, query: ActiveDirectoryQuery, settings: ReconcileSettings) -> Self {
        Self {
            store,
            query,
            settings,
        }
    }

    pub fn settings(&self) -> &ReconcileSettings {
        &self.settings
    }

    /// Run over the full user list and close the directory connection afterwards,
    /// whether or not the run succeeded.
    pub async fn run_and_close<D>(&self, mut directory: D) -> Result<RunReport>
    where
        D: DirectoryClient,
    {
        let result = self.run(&mut directory).await;

        if let Err(e) = directory.close().await {
            warn!(error = %e, "Failed to close directory connection");
        }

        result
    }

    /// Fetch the user snapshot and reconcile it
    pub async fn run<D>(&self, directory: &mut D) -> Result<RunReport>
    where
        D: DirectoryClient + ?Sized,
    {
        let users = self.store.list_users().await?;
        info!(total = users.len(), "Found users");

        self.reconcile_users(&users, directory).await
    }

    /// Reconcile a user snapshot in order.
    ///
    /// Returns early only on a directory error; per-user delete failures are
    /// recorded in the report.
    pub async fn reconcile_users<D>(&self, users: &[User], directory: &mut D) -> Result<RunReport>
    where
        D: DirectoryClient + ?Sized,
    {
        info!(
            confirm = self.settings.confirm,
            identity_prefix = %self.settings.identity_prefix,
            "Starting user reconciliation"
        );

        let mut report = RunReport::new(self.settings.confirm);
        for user in users {
            let outcome = self.reconcile_user(user, directory).await?;
            report.record(user.name.clone(), outcome);
        }

        let summary = report.summary();
        info!(
            total = summary.total,
            skipped = summary.skipped,
            retained = summary.retained,
            would_remove = summary.would_remove,
            removed = summary.removed,
            failed = summary.failed,
            confirm = self.settings.confirm,
            "Reconciliation completed"
        );

        Ok(report)
    }

    #[instrument(skip_all, fields(user = %user.name))]
    async fn reconcile_user<D>(&self, user: &User, directory: &mut D) -> Result<UserOutcome>
    where
        D: DirectoryClient + ?Sized,
    {
        let Some(identity) = user.sole_identity() else {
            debug!(
                expected = 1,
                got = user.identities.len(),
                "Skipping user due to identity count mismatch"
            );
            return Ok(UserOutcome::Skipped(SkipReason::IdentityCount {
                found: user.identities.len(),
            }));
        };

        if !identity.has_prefix(&self.settings.identity_prefix) {
            debug!(
                identity_prefix = identity.provider(),
                expected_prefix = %self.settings.identity_prefix,
                "User identity prefix is wrong, skipping"
            );
            return Ok(UserOutcome::Skipped(SkipReason::PrefixMismatch {
                identity: identity.to_string(),
            }));
        }

        debug!("Found user with correct prefix, searching in LDAP");
        let entries = search_user(directory, &self.query, &user.name).await?;
        let verdict = evaluate(&entries);

        if !verdict.is_eligible() {
            return Ok(UserOutcome::Retained {
                entries: verdict.entries.len(),
            });
        }

        info!(
            identity = %identity,
            confirm = self.settings.confirm,
            "Remove user and identity"
        );

        if !self.settings.confirm {
            return Ok(UserOutcome::WouldRemove {
                identity: identity.to_string(),
            });
        }

        Ok(self.remove(user, identity).await)
    }

    /// Delete the identity, then the user only if that succeeded.
    async fn remove(&self, user: &User, identity: &IdentityRef) -> UserOutcome {
        debug!(identity = %identity, "Deleting identity");
        if let Err(e) = self.store.delete_identity(identity.as_str()).await {
            error!(identity = %identity, error = %e, "Unable to delete identity");
            return UserOutcome::IdentityDeleteFailed {
                identity: identity.to_string(),
                error: e.to_string(),
            };
        }
        info!(identity = %identity, "Successfully deleted identity");

        debug!("Deleting user");
        if let Err(e) = self.store.delete_user(&user.name).await {
            error!(identity = %identity, error = %e, "Unable to delete user");
            return UserOutcome::UserDeleteFailed {
                identity: identity.to_string(),
                error: e.to_string(),
            };
        }
        info!("Successfully deleted user");

        UserOutcome::Removed {
            identity: identity.to_string(),
        }
    }
}
