//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::{DomainError, HaltReason};
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => infra_exit_code(e),
        }
    }

    /// Silent halts (a dismissed picker) print nothing.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            CliError::Infra(InfraError::Application(ApplicationError::Halted(h)))
                if h.reason.is_silent()
        )
    }
}

fn infra_exit_code(e: &InfraError) -> i32 {
    match e {
        InfraError::Application(app) => application_exit_code(app),
        InfraError::Io { .. } => crate::exitcode::IOERR,
        InfraError::Http { .. } => crate::exitcode::UNAVAILABLE,
        InfraError::Decode { .. } => crate::exitcode::DATAERR,
        InfraError::Clipboard { .. } | InfraError::Selector { .. } => crate::exitcode::SOFTWARE,
        InfraError::Shell { exit_code, .. } => exit_code.unwrap_or(crate::exitcode::SOFTWARE),
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::Halted(halt) => match halt.reason {
            HaltReason::Cancelled => crate::exitcode::OK,
            HaltReason::MissingCredential => crate::exitcode::NOPERM,
            HaltReason::NoRepositories { .. } | HaltReason::ManifestNotFound { .. } => {
                crate::exitcode::NOINPUT
            }
            HaltReason::NoEnvironments { .. } | HaltReason::UnresolvedDatabase { .. } => {
                crate::exitcode::DATAERR
            }
            HaltReason::UnknownEnvironment { .. } => crate::exitcode::USAGE,
        },
        ApplicationError::Domain(DomainError::InvalidManifest { .. }) => crate::exitcode::DATAERR,
        ApplicationError::Domain(_) => crate::exitcode::SOFTWARE,
        ApplicationError::HostingApi { source, .. } => infra_exit_code(source),
        ApplicationError::Config { .. } => crate::exitcode::CONFIG,
        ApplicationError::Selection { .. } | ApplicationError::OperationFailed { .. } => {
            crate::exitcode::SOFTWARE
        }
    }
}
