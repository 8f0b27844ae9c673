//! osluc Directory - LDAP / Active Directory side of the user cleanup
//!
//! This crate provides:
//! - The validated LDAP sync configuration (`LDAPSyncConfig` YAML)
//! - Search filter construction for a local username
//! - Activity evaluation of the returned directory entries
//! - An `ldap3` backed [`DirectoryClient`](osluc_core::DirectoryClient)

pub mod activity;
pub mod config;
pub mod ldap;
pub mod query;


pub use activity::{
    evaluate, evaluate_at, AccountExpiry, ActivityVerdict, EntryActivity, TimestampReading,
};
pub use config::{ActiveDirectoryQuery, PasswordSource, SyncConfig, SyncConfigError, UsersQuery};
pub use ldap::LdapDirectory;
pub use query::{
    build_search_request, build_user_filter, escape_filter_value, search_user,
    USER_SEARCH_ATTRIBUTES,
};
