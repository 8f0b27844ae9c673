//! Error types for osluc

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OslucError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Directory error: {message}")]
    Directory { message: String },

    #[error("Identity store error: {message}")]
    Store { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl OslucError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn directory(message: impl Into<String>) -> Self {
        Self::Directory {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error must abort the whole run.
    ///
    /// Directory failures are fatal: an unreachable directory must never be
    /// read as "every user is absent". Store errors only affect the user being
    /// processed when they are raised by a delete.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Store { .. })
    }
}

pub type Result<T> = std::result::Result<T, OslucError>;
