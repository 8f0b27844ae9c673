//! Activity evaluation of directory search results
//!
//! A username with no matching entry is a removal candidate. When entries are
//! found the account exists and is kept; the logon and expiry timestamps are
//! decoded and logged but do not change the verdict.

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use osluc_core::{decode_file_time, DirectoryEntry, FileTimeError};

/// `accountExpires` values meaning the account never expires
const NEVER_EXPIRES: [&str; 2] = ["0", "9223372036854775807"];

/// Decoded FileTime attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampReading {
    /// Attribute not returned for the entry
    Missing,
    /// Attribute present but not a valid FileTime
    Invalid(FileTimeError),
    Value(DateTime<Utc>),
}

impl TimestampReading {
    pub fn from_entry(entry: &DirectoryEntry, attribute: &str) -> Self {
        match entry.attr(attribute) {
            None => Self::Missing,
            Some(raw) => match decode_file_time(raw) {
                Ok(ts) => Self::Value(ts),
                Err(e) => Self::Invalid(e),
            },
        }
    }

    pub fn value(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Value(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Whole days between the timestamp and `now`, negative for the future
    pub fn days_before(&self, now: DateTime<Utc>) -> Option<i64> {
        self.value().map(|ts| (now - ts).num_days())
    }
}

/// Decoded `accountExpires`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountExpiry {
    Never,
    At(TimestampReading),
}

impl AccountExpiry {
    pub fn from_entry(entry: &DirectoryEntry) -> Self {
        match entry.attr("accountExpires") {
            Some(raw) if NEVER_EXPIRES.contains(&raw) => Self::Never,
            _ => Self::At(TimestampReading::from_entry(entry, "accountExpires")),
        }
    }
}

/// Decoded activity attributes of one directory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryActivity {
    pub dn: String,
    pub cn: Option<String>,
    pub sam_account_name: Option<String>,
    pub last_logon: TimestampReading,
    pub last_logon_timestamp: TimestampReading,
    pub account_expires: AccountExpiry,
}

impl EntryActivity {
    pub fn from_entry(entry: &DirectoryEntry) -> Self {
        Self {
            dn: entry.dn.clone(),
            cn: entry.attr("cn").map(str::to_string),
            sam_account_name: entry.attr("sAMAccountName").map(str::to_string),
            last_logon: TimestampReading::from_entry(entry, "lastLogon"),
            last_logon_timestamp: TimestampReading::from_entry(entry, "lastLogonTimestamp"),
            account_expires: AccountExpiry::from_entry(entry),
        }
    }
}

/// Result of evaluating the entries found for one username
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityVerdict {
    pub entries: Vec<EntryActivity>,
}

impl ActivityVerdict {
    /// The account has no directory entry and may be removed.
    pub fn is_eligible(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Evaluate search results against the current time
pub fn evaluate(entries: &[DirectoryEntry]) -> ActivityVerdict {
    evaluate_at(entries, Utc::now())
}

/// Evaluate search results, computing logged ages relative to `now`
pub fn evaluate_at(entries: &[DirectoryEntry], now: DateTime<Utc>) -> ActivityVerdict {
    if entries.is_empty() {
        debug!("User not found in LDAP, can be removed");
        return ActivityVerdict { entries: vec![] };
    }

    debug!(found = entries.len(), "User found in LDAP, checking user attributes");

    let entries = entries
        .iter()
        .map(|entry| {
            let activity = EntryActivity::from_entry(entry);
            log_activity(&activity, now);
            activity
        })
        .collect();

    ActivityVerdict { entries }
}

fn log_activity(activity: &EntryActivity, now: DateTime<Utc>) {
    log_reading("lastLogon", &activity.dn, &activity.last_logon);
    log_reading(
        "lastLogonTimestamp",
        &activity.dn,
        &activity.last_logon_timestamp,
    );
    let (account_expires, account_expires_days) = match &activity.account_expires {
        AccountExpiry::Never => ("never".to_string(), None),
        AccountExpiry::At(reading) => {
            log_reading("accountExpires", &activity.dn, reading);
            (display_reading(reading), reading.days_before(now))
        }
    };

    debug!(
        dn = %activity.dn,
        cn = activity.cn.as_deref().unwrap_or(""),
        sam_account_name = activity.sam_account_name.as_deref().unwrap_or(""),
        last_logon = %display_reading(&activity.last_logon),
        last_logon_days_ago = ?activity.last_logon.days_before(now),
        last_logon_timestamp = %display_reading(&activity.last_logon_timestamp),
        last_logon_timestamp_days_ago = ?activity.last_logon_timestamp.days_before(now),
        account_expires = %account_expires,
        account_expires_days_ago = ?account_expires_days,
        "Attributes"
    );
}

fn log_reading(attribute: &str, dn: &str, reading: &TimestampReading) {
    match reading {
        TimestampReading::Missing => {
            debug!(attribute, dn, "FileTime attribute not present");
        }
        TimestampReading::Invalid(e) => {
            error!(attribute, dn, error = %e, "Cannot convert FileTime attribute");
        }
        TimestampReading::Value(_) => {}
    }
}

fn display_reading(reading: &TimestampReading) -> String {
    match reading {
        TimestampReading::Missing => "missing".to_string(),
        TimestampReading::Invalid(_) => "invalid".to_string(),
        TimestampReading::Value(ts) => ts.to_rfc3339(),
    }
}
