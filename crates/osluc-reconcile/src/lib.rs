//! osluc Reconcile - prunes OpenShift users whose directory account is gone

pub mod reconciler;
pub mod report;

pub use reconciler::{ReconcileSettings, Reconciler, DEFAULT_IDENTITY_PREFIX};
pub use report::{RunReport, RunSummary, SkipReason, UserOutcome, UserReport};
