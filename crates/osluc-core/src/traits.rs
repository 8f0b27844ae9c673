//! Collaborator traits for the identity store and the directory

use crate::{
    error::Result,
    models::{DirectoryEntry, SearchRequest, User},
};
use async_trait::async_trait;

/// OpenShift-style user/identity store.
///
/// Each call is an independent remote operation; there is no transaction
/// spanning an identity delete and the matching user delete.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Snapshot of every user, in list-response order
    async fn list_users(&self) -> Result<Vec<User>>;

    async fn delete_identity(&self, name: &str) -> Result<()>;

    async fn delete_user(&self, name: &str) -> Result<()>;
}

/// A bound directory connection
#[async_trait]
pub trait DirectoryClient: Send {
    /// Run a subtree search. Any transport or protocol failure is an error,
    /// never an empty result.
    async fn search(&mut self, request: &SearchRequest) -> Result<Vec<DirectoryEntry>>;

    /// Release the connection
    async fn close(&mut self) -> Result<()>;
}
