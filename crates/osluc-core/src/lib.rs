//! osluc Core - Domain types and collaborator traits for OpenShift LDAP user cleanup

pub mod error;
pub mod filetime;
pub mod models;
pub mod traits;

#[cfg(test)]
mod tests;

pub use error::*;
pub use filetime::{decode_file_time, FileTimeError};
pub use models::*;
pub use traits::*;
