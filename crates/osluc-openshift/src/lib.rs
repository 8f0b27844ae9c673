//! OpenShift user/identity store for osluc
//!
//! Talks to the `user.openshift.io/v1` API through `kube` dynamic objects.

pub mod client;
pub mod store;

pub use client::{create_client, ClusterConfig};
pub use store::{user_from_object, OpenShiftStore, DEFAULT_PAGE_SIZE};
