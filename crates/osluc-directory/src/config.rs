//! LDAP sync configuration
//!
//! The file follows the OpenShift `LDAPSyncConfig` format. Only the keys the
//! cleanup needs are read; everything else is ignored. Validation walks the
//! whole document and reports every problem it finds at once.

use serde_yaml::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use osluc_core::{DerefAliases, OslucError, Result};

const EXPECTED_KIND: &str = "LDAPSyncConfig";
const EXPECTED_API_VERSION: &str = "v1";
const SUBTREE_SCOPE: &str = "sub";

/// Validated sync configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Directory URL, `ldap://` or `ldaps://`
    pub url: String,
    pub bind_dn: String,
    pub bind_password: PasswordSource,
    /// Skip TLS certificate verification
    pub insecure: bool,
    pub augmented_active_directory: ActiveDirectoryQuery,
}

/// Where the bind password comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordSource {
    File(PathBuf),
    Env(String),
    Value(String),
}

/// The `augmentedActiveDirectory` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDirectoryQuery {
    pub users_query: UsersQuery,
    /// Attributes compared against the local username, OR-ed together
    pub user_name_attributes: Vec<String>,
}

/// The `augmentedActiveDirectory.usersQuery` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsersQuery {
    pub base_dn: String,
    /// Base filter AND-ed with the username clauses, empty for none
    pub filter: String,
    pub deref_aliases: DerefAliases,
}

/// Every problem found in a sync configuration document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid sync configuration: {}", .problems.join("; "))]
pub struct SyncConfigError {
    pub problems: Vec<String>,
}

impl From<SyncConfigError> for OslucError {
    fn from(err: SyncConfigError) -> Self {
        OslucError::config(err.to_string())
    }
}

impl SyncConfig {
    /// Read and validate a sync configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading LDAP sync configuration");

        let content = std::fs::read_to_string(path).map_err(|e| {
            OslucError::config(format!(
                "Unable to read sync config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(Self::from_yaml_str(&content)?)
    }

    /// Parse and validate a sync configuration document
    pub fn from_yaml_str(content: &str) -> std::result::Result<Self, SyncConfigError> {
        let root: Value = serde_yaml::from_str(content).map_err(|e| SyncConfigError {
            problems: vec![format!("unable to parse YAML: {}", e)],
        })?;

        Self::from_value(&root)
    }

    /// Validate an already parsed YAML document
    pub fn from_value(root: &Value) -> std::result::Result<Self, SyncConfigError> {
        let mut v = Validator::default();

        if !root.is_mapping() {
            v.problem("", format!("expected a mapping, found {}", type_name(root)));
            return Err(v.into_error());
        }

        if let Some(kind) = v.optional_str(root, &["kind"]) {
            if kind != EXPECTED_KIND {
                v.problem("kind", format!("expected {EXPECTED_KIND}, found {kind:?}"));
            }
        }
        if let Some(version) = v.optional_str(root, &["apiVersion"]) {
            if version != EXPECTED_API_VERSION {
                v.problem(
                    "apiVersion",
                    format!("expected {EXPECTED_API_VERSION}, found {version:?}"),
                );
            }
        }

        let url = v.required_non_empty_str(root, &["url"]);
        let bind_dn = v.required_str(root, &["bindDN"]);
        let bind_password = v.password_source(root);
        let insecure = v.optional_bool(root, &["insecure"]).unwrap_or(false);

        let users_query_path = ["augmentedActiveDirectory", "usersQuery"];
        let base_dn = v.required_non_empty_str(root, &path_with(&users_query_path, "baseDN"));
        let filter = v
            .optional_str(root, &path_with(&users_query_path, "filter"))
            .unwrap_or_default();
        // Anything but the string "always" means never.
        let deref_aliases = DerefAliases::from_config(
            lookup(root, &path_with(&users_query_path, "derefAliases")).and_then(Value::as_str),
        );
        if let Some(scope) = v.optional_str(root, &path_with(&users_query_path, "scope")) {
            if scope != SUBTREE_SCOPE {
                v.problem(
                    &join_path(&path_with(&users_query_path, "scope")),
                    format!("only {SUBTREE_SCOPE:?} is supported, found {scope:?}"),
                );
            }
        }
        let user_name_attributes =
            v.required_str_list(root, &["augmentedActiveDirectory", "userNameAttributes"]);

        if !v.problems.is_empty() {
            return Err(v.into_error());
        }

        // Every required value was recorded as a problem when absent.
        match (url, bind_dn, bind_password, base_dn, user_name_attributes) {
            (
                Some(url),
                Some(bind_dn),
                Some(bind_password),
                Some(base_dn),
                Some(user_name_attributes),
            ) => {
                let config = SyncConfig {
                    url,
                    bind_dn,
                    bind_password,
                    insecure,
                    augmented_active_directory: ActiveDirectoryQuery {
                        users_query: UsersQuery {
                            base_dn,
                            filter,
                            deref_aliases,
                        },
                        user_name_attributes,
                    },
                };
                debug!(
                    url = %config.url,
                    bind_dn = %config.bind_dn,
                    "Sync configuration validated"
                );
                Ok(config)
            }
            _ => Err(SyncConfigError {
                problems: vec!["incomplete sync configuration".to_string()],
            }),
        }
    }
}

impl PasswordSource {
    /// Resolve the bind password. A trailing line break in a password file is dropped.
    pub fn resolve(&self) -> Result<String> {
        match self {
            Self::File(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    OslucError::config(format!(
                        "Unable to read password file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Ok(content
                    .strip_suffix('\n')
                    .map(|s| s.strip_suffix('\r').unwrap_or(s))
                    .unwrap_or(&content)
                    .to_string())
            }
            Self::Env(name) => std::env::var(name).map_err(|e| {
                OslucError::config(format!(
                    "Unable to read password from environment variable {}: {}",
                    name, e
                ))
            }),
            Self::Value(value) => Ok(value.clone()),
        }
    }
}

// =============================================================================
// Validation helpers
// =============================================================================

#[derive(Default)]
struct Validator {
    problems: Vec<String>,
}

impl Validator {
    fn problem(&mut self, path: &str, message: impl Into<String>) {
        let message = message.into();
        if path.is_empty() {
            self.problems.push(message);
        } else {
            self.problems.push(format!("{path}: {message}"));
        }
    }

    fn into_error(self) -> SyncConfigError {
        SyncConfigError {
            problems: self.problems,
        }
    }

    fn optional_str(&mut self, root: &Value, path: &[&str]) -> Option<String> {
        match lookup(root, path)? {
            Value::String(s) => Some(s.clone()),
            other => {
                self.problem(
                    &join_path(path),
                    format!("expected a string, found {}", type_name(other)),
                );
                None
            }
        }
    }

    fn required_str(&mut self, root: &Value, path: &[&str]) -> Option<String> {
        if lookup(root, path).is_none() {
            self.problem(&join_path(path), "required key is missing");
            return None;
        }
        self.optional_str(root, path)
    }

    fn required_non_empty_str(&mut self, root: &Value, path: &[&str]) -> Option<String> {
        let value = self.required_str(root, path)?;
        if value.is_empty() {
            self.problem(&join_path(path), "must not be empty");
            return None;
        }
        Some(value)
    }

    fn optional_bool(&mut self, root: &Value, path: &[&str]) -> Option<bool> {
        match lookup(root, path)? {
            Value::Bool(b) => Some(*b),
            other => {
                self.problem(
                    &join_path(path),
                    format!("expected a boolean, found {}", type_name(other)),
                );
                None
            }
        }
    }

    fn required_str_list(&mut self, root: &Value, path: &[&str]) -> Option<Vec<String>> {
        let key = join_path(path);
        let items = match lookup(root, path) {
            None => {
                self.problem(&key, "required key is missing");
                return None;
            }
            Some(Value::Sequence(items)) => items,
            Some(other) => {
                self.problem(
                    &key,
                    format!("expected a sequence of strings, found {}", type_name(other)),
                );
                return None;
            }
        };

        if items.is_empty() {
            self.problem(&key, "must list at least one attribute");
            return None;
        }

        let mut values = Vec::with_capacity(items.len());
        let mut valid = true;
        for (idx, item) in items.iter().enumerate() {
            match item {
                Value::String(s) if !s.is_empty() => values.push(s.clone()),
                Value::String(_) => {
                    self.problem(&format!("{key}[{idx}]"), "must not be empty");
                    valid = false;
                }
                other => {
                    self.problem(
                        &format!("{key}[{idx}]"),
                        format!("expected a string, found {}", type_name(other)),
                    );
                    valid = false;
                }
            }
        }

        valid.then_some(values)
    }

    fn password_source(&mut self, root: &Value) -> Option<PasswordSource> {
        let value = match lookup(root, &["bindPassword"]) {
            None => {
                self.problem("bindPassword", "required key is missing");
                return None;
            }
            Some(value) => value,
        };

        match value {
            Value::String(s) => Some(PasswordSource::Value(s.clone())),
            Value::Mapping(_) => {
                let file = self.optional_str(root, &["bindPassword", "file"]);
                let env = self.optional_str(root, &["bindPassword", "env"]);
                let literal = self.optional_str(root, &["bindPassword", "value"]);

                match (file, env, literal) {
                    (Some(file), None, None) if !file.is_empty() => {
                        Some(PasswordSource::File(PathBuf::from(file)))
                    }
                    (None, Some(env), None) if !env.is_empty() => Some(PasswordSource::Env(env)),
                    (None, None, Some(literal)) => Some(PasswordSource::Value(literal)),
                    (None, None, None) => {
                        self.problem("bindPassword", "one of file, env or value is required");
                        None
                    }
                    _ => {
                        self.problem(
                            "bindPassword",
                            "exactly one non-empty source of file, env or value is allowed",
                        );
                        None
                    }
                }
            }
            other => {
                self.problem(
                    "bindPassword",
                    format!("expected a string or a mapping, found {}", type_name(other)),
                );
                None
            }
        }
    }
}

/// Walk nested mappings. A non-mapping intermediate is reported as missing.
fn lookup<'v>(root: &'v Value, path: &[&str]) -> Option<&'v Value> {
    path.iter()
        .try_fold(root, |value, key| value.get(*key))
        .filter(|value| !value.is_null())
}

fn path_with<'a>(prefix: &[&'a str], key: &'a str) -> Vec<&'a str> {
    let mut path = prefix.to_vec();
    path.push(key);
    path
}

fn join_path(path: &[&str]) -> String {
    path.join(".")
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
