//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::{DomainError, Halt};
use crate::infrastructure::InfraError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// The lease flow stopped before producing a command.
    #[error("{0}")]
    Halted(Halt),

    #[error("{context}: {source}")]
    HostingApi {
        context: String,
        #[source]
        source: Box<InfraError>,
    },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("selection failed: {message}")]
    Selection { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<Halt> for ApplicationError {
    fn from(halt: Halt) -> Self {
        Self::Halted(halt)
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
