//! osluc - OpenShift LDAP user cleanup
//!
//! Removes OpenShift users (and their identity) whose single LDAP identity no
//! longer has an account in the directory. Dry-run unless `OSLUC_CONFIRM` is set.

use anyhow::{Context, Result};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

mod config;
mod logging;

use config::Settings;
use osluc_directory::{LdapDirectory, SyncConfig};
use osluc_openshift::{create_client, ClusterConfig, OpenShiftStore};
use osluc_reconcile::{Reconciler, RunReport};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let settings = Settings::load();

    let configured_level = settings
        .as_ref()
        .map(|s| s.log_level.as_str())
        .unwrap_or("INFO");
    let (level, fallback) = logging::init_tracing(configured_level);
    if fallback {
        warn!(
            value = configured_level,
            "Couldn't parse OSLUC_LOG_LEVEL, defaulting to INFO"
        );
    }
    info!(level = %level, "Logging setup");

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Parsing environment variables");
            return ExitCode::FAILURE;
        }
    };

    execute(&settings).await
}

/// Run once and map the outcome to the process exit code
async fn execute(settings: &Settings) -> ExitCode {
    match run(settings).await {
        Ok(report) => {
            info!(users = report.users.len(), "osluc finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "osluc aborted");
            ExitCode::FAILURE
        }
    }
}

async fn run(settings: &Settings) -> Result<RunReport> {
    info!(confirm = settings.confirm, "OSLUC confirm flag");

    let cluster = ClusterConfig::from_path(&settings.kubeconfig);
    let client = create_client(&cluster)
        .await
        .context("Unable to create Kubernetes client")?;
    let store = OpenShiftStore::new(client);

    let sync_config = SyncConfig::load(&settings.ldap_sync_config_path)
        .context("Unable to load LDAPSyncConfig file")?;

    let directory = LdapDirectory::connect(&sync_config)
        .await
        .context("Unable to connect to LDAP")?;

    let reconciler = Reconciler::new(
        Arc::new(store),
        sync_config.augmented_active_directory.clone(),
        settings.reconcile_settings(),
    );

    let report = reconciler
        .run_and_close(directory)
        .await
        .context("Reconciliation aborted")?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn settings(kubeconfig: &str) -> Settings {
        Settings {
            log_level: "INFO".to_string(),
            identity_prefix: "corp_ldap".to_string(),
            kubeconfig: kubeconfig.to_string(),
            ldap_sync_config_path: PathBuf::from("/nonexistent/osluc/sync.yaml"),
            confirm: true,
        }
    }

    #[tokio::test]
    async fn test_unreadable_kubeconfig_exits_with_failure() {
        let settings = settings("/nonexistent/osluc/kubeconfig");

        let err = run(&settings).await.err().unwrap();
        assert!(format!("{err:#}").contains("Unable to create Kubernetes client"));
        assert_eq!(execute(&settings).await, ExitCode::FAILURE);
    }
}
