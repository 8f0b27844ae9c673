//! Directory query construction for a local username

use tracing::{debug, instrument};

use osluc_core::{DirectoryClient, DirectoryEntry, Result, SearchRequest};

use crate::config::ActiveDirectoryQuery;

/// Attributes requested for every user lookup
pub const USER_SEARCH_ATTRIBUTES: [&str; 6] = [
    "dn",
    "cn",
    "lastLogon",
    "accountExpires",
    "sAMAccountName",
    "lastLogonTimestamp",
];

/// Escape special characters in LDAP filter values (RFC 4515).
///
/// Characters that must be escaped: * ( ) \ NUL
pub fn escape_filter_value(value: &str) -> String {
    value
        .replace('\\', "\\5c")
        .replace('*', "\\2a")
        .replace('(', "\\28")
        .replace(')', "\\29")
        .replace('\0', "\\00")
}

/// Build the search filter for a username.
///
/// One `(attr=username)` clause per attribute, OR-ed together, then AND-ed with
/// the base filter when one is configured.
pub fn build_user_filter(query: &ActiveDirectoryQuery, username: &str) -> String {
    let username = escape_filter_value(username);

    let clauses: String = query
        .user_name_attributes
        .iter()
        .map(|attr| format!("({}={})", attr, username))
        .collect();
    let username_filter = format!("(|{})", clauses);

    let base_filter = &query.users_query.filter;
    if base_filter.is_empty() {
        username_filter
    } else {
        format!("(&{}{})", base_filter, username_filter)
    }
}

/// Full subtree search request for a username
pub fn build_search_request(query: &ActiveDirectoryQuery, username: &str) -> SearchRequest {
    SearchRequest {
        base_dn: query.users_query.base_dn.clone(),
        filter: build_user_filter(query, username),
        deref_aliases: query.users_query.deref_aliases,
        attributes: USER_SEARCH_ATTRIBUTES.iter().map(|a| a.to_string()).collect(),
    }
}

/// Look a username up in the directory.
///
/// Errors from the directory are returned as-is; callers treat them as fatal.
#[instrument(skip(directory, query))]
pub async fn search_user<D>(
    directory: &mut D,
    query: &ActiveDirectoryQuery,
    username: &str,
) -> Result<Vec<DirectoryEntry>>
where
    D: DirectoryClient + ?Sized,
{
    let request = build_search_request(query, username);
    debug!(
        filter = %request.filter,
        base_dn = %request.base_dn,
        deref_aliases = %request.deref_aliases,
        "Using LDAP filter"
    );

    let entries = directory.search(&request).await?;
    debug!(filter = %request.filter, found = entries.len(), "LDAP search completed");
    Ok(entries)
}
