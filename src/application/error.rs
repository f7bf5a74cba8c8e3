//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("configuration incomplete, missing: {}", missing.join(", "))]
    ConfigurationIncomplete { missing: Vec<&'static str> },

    #[error("invalid row source {path}: {message}")]
    RowSource { path: PathBuf, message: String },

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApplicationError {
    /// Structural errors leave previously rendered output in place.
    pub fn is_structural(&self) -> bool {
        matches!(self, ApplicationError::Domain(_))
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
