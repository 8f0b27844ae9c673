//! Domain models shared by the directory, store and reconciliation crates

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Identity Store Models
// =============================================================================

/// Reference from a local user to an external identity, `<provider>:<external-id>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityRef(String);

impl IdentityRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Provider part, everything before the first `:`.
    pub fn provider(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(p, _)| p)
    }

    /// External username part, everything after the first `:`.
    pub fn external_id(&self) -> Option<&str> {
        self.0.split_once(':').map(|(_, id)| id)
    }

    /// Plain string prefix test against the whole reference.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl std::fmt::Display for IdentityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdentityRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Local user snapshot as listed from the identity store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub identities: Vec<IdentityRef>,
}

impl User {
    pub fn new(name: impl Into<String>, identities: Vec<IdentityRef>) -> Self {
        Self {
            name: name.into(),
            identities,
        }
    }

    /// The identity of a user that has exactly one, the only shape eligible for pruning.
    pub fn sole_identity(&self) -> Option<&IdentityRef> {
        match self.identities.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

// =============================================================================
// Directory Models
// =============================================================================

/// Alias dereferencing policy for directory searches.
///
/// Closed two-way mapping: only the literal `always` selects [`DerefAliases::Always`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerefAliases {
    #[default]
    Never,
    Always,
}

impl DerefAliases {
    pub fn from_config(value: Option<&str>) -> Self {
        match value {
            Some("always") => Self::Always,
            _ => Self::Never,
        }
    }
}

impl std::fmt::Display for DerefAliases {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Never => write!(f, "never"),
            Self::Always => write!(f, "always"),
        }
    }
}

/// Subtree search issued against the directory, no size or time limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub base_dn: String,
    pub filter: String,
    pub deref_aliases: DerefAliases,
    pub attributes: Vec<String>,
}

/// Single search result entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub dn: String,
    pub attrs: HashMap<String, Vec<String>>,
}

impl DirectoryEntry {
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attrs: HashMap::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.entry(name.into()).or_default().push(value.into());
        self
    }

    /// First value of an attribute. Attribute names compare case-insensitively.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }
}
