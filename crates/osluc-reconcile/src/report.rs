//! Per-run report of what happened to each user

/// Why a user was not looked up in the directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Only users with exactly one identity are considered
    IdentityCount { found: usize },
    /// The sole identity does not carry the configured prefix
    PrefixMismatch { identity: String },
}

/// Outcome for a single user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserOutcome {
    Skipped(SkipReason),
    /// Found in the directory, kept
    Retained { entries: usize },
    /// Eligible, but confirm mode is off
    WouldRemove { identity: String },
    /// Identity and user both deleted
    Removed { identity: String },
    /// Identity delete failed, the user was not touched
    IdentityDeleteFailed { identity: String, error: String },
    /// Identity deleted but the user delete failed, leaving a user without identity
    UserDeleteFailed { identity: String, error: String },
}

impl UserOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::IdentityDeleteFailed { .. } | Self::UserDeleteFailed { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserReport {
    pub user: String,
    pub outcome: UserOutcome,
}

/// Aggregated counters of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub skipped: usize,
    pub retained: usize,
    pub would_remove: usize,
    pub removed: usize,
    pub failed: usize,
}

/// Everything a run did, in processing order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub confirm: bool,
    pub users: Vec<UserReport>,
}

impl RunReport {
    pub fn new(confirm: bool) -> Self {
        Self {
            confirm,
            users: Vec::new(),
        }
    }

    pub fn record(&mut self, user: impl Into<String>, outcome: UserOutcome) {
        self.users.push(UserReport {
            user: user.into(),
            outcome,
        });
    }

    pub fn outcome_for(&self, user: &str) -> Option<&UserOutcome> {
        self.users
            .iter()
            .find(|report| report.user == user)
            .map(|report| &report.outcome)
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            total: self.users.len(),
            ..RunSummary::default()
        };

        for report in &self.users {
            match report.outcome {
                UserOutcome::Skipped(_) => summary.skipped += 1,
                UserOutcome::Retained { .. } => summary.retained += 1,
                UserOutcome::WouldRemove { .. } => summary.would_remove += 1,
                UserOutcome::Removed { .. } => summary.removed += 1,
                UserOutcome::IdentityDeleteFailed { .. } | UserOutcome::UserDeleteFailed { .. } => {
                    summary.failed += 1
                }
            }
        }

        summary
    }
}
