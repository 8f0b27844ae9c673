//! Process configuration from the environment

use anyhow::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use osluc_reconcile::{ReconcileSettings, DEFAULT_IDENTITY_PREFIX};

const ENV_PREFIX: &str = "OSLUC";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// `OSLUC_LOG_LEVEL`
    pub log_level: String,
    /// `OSLUC_IDENTITY_PREFIX`, identities must start with it to be considered
    pub identity_prefix: String,
    /// `KUBECONFIG`, empty for in-cluster credentials
    #[serde(default)]
    pub kubeconfig: String,
    /// `OSLUC_LDAP_SYNC_CONFIG_PATH`
    pub ldap_sync_config_path: PathBuf,
    /// `OSLUC_CONFIRM`, remove users instead of only reporting them
    pub confirm: bool,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_vars(None)
    }

    /// Build settings from an explicit variable map instead of the process environment
    pub fn from_vars(vars: Option<HashMap<String, String>>) -> Result<Self> {
        let kubeconfig = match &vars {
            Some(vars) => vars.get("KUBECONFIG").cloned(),
            None => std::env::var("KUBECONFIG").ok(),
        };

        let config = config::Config::builder()
            .set_default("log_level", "INFO")?
            .set_default("identity_prefix", DEFAULT_IDENTITY_PREFIX)?
            .set_default("kubeconfig", "")?
            .set_default("ldap_sync_config_path", "sync.yaml")?
            .set_default("confirm", false)?
            // Values stay strings; `confirm` is converted on deserialize.
            .add_source(config::Environment::with_prefix(ENV_PREFIX).source(vars))
            .set_override_option("kubeconfig", kubeconfig)?
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn reconcile_settings(&self) -> ReconcileSettings {
        ReconcileSettings {
            identity_prefix: self.identity_prefix.clone(),
            confirm: self.confirm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vars(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_vars(vars(&[])).unwrap();

        assert_eq!(settings.log_level, "INFO");
        assert_eq!(settings.identity_prefix, "notset");
        assert_eq!(settings.kubeconfig, "");
        assert_eq!(settings.ldap_sync_config_path, PathBuf::from("sync.yaml"));
        assert!(!settings.confirm);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_vars(vars(&[
            ("OSLUC_LOG_LEVEL", "DEBUG"),
            ("OSLUC_IDENTITY_PREFIX", "corp_ldap"),
            ("OSLUC_LDAP_SYNC_CONFIG_PATH", "/etc/osluc/sync.yaml"),
            ("OSLUC_CONFIRM", "TRUE"),
            ("KUBECONFIG", "/home/admin/.kube/config"),
        ]))
        .unwrap();

        assert_eq!(settings.log_level, "DEBUG");
        assert_eq!(settings.identity_prefix, "corp_ldap");
        assert_eq!(settings.kubeconfig, "/home/admin/.kube/config");
        assert_eq!(
            settings.ldap_sync_config_path,
            PathBuf::from("/etc/osluc/sync.yaml")
        );
        assert!(settings.confirm);
    }

    #[test]
    fn test_confirm_false_spelling() {
        let settings = Settings::from_vars(vars(&[("OSLUC_CONFIRM", "FALSE")])).unwrap();
        assert!(!settings.confirm);
    }

    #[test]
    fn test_string_values_kept_verbatim() {
        for raw in ["007", "1e3", "nan", "TRUE"] {
            let settings = Settings::from_vars(vars(&[
                ("OSLUC_IDENTITY_PREFIX", raw),
                ("OSLUC_LDAP_SYNC_CONFIG_PATH", raw),
                ("OSLUC_LOG_LEVEL", raw),
            ]))
            .unwrap();

            assert_eq!(settings.identity_prefix, raw);
            assert_eq!(settings.ldap_sync_config_path, PathBuf::from(raw));
            assert_eq!(settings.log_level, raw);
        }
    }

    #[test]
    fn test_invalid_confirm_rejected() {
        assert!(Settings::from_vars(vars(&[("OSLUC_CONFIRM", "maybe")])).is_err());
    }

    #[test]
    fn test_reconcile_settings() {
        let settings = Settings::from_vars(vars(&[
            ("OSLUC_IDENTITY_PREFIX", "corp_ldap"),
            ("OSLUC_CONFIRM", "true"),
        ]))
        .unwrap();

        assert_eq!(
            settings.reconcile_settings(),
            ReconcileSettings {
                identity_prefix: "corp_ldap".to_string(),
                confirm: true,
            }
        );
    }
}
