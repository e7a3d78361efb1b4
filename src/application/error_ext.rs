//! Error conversion helpers for hosting-API and subprocess calls
//!
//! Provides extension traits for cleaner error handling with context.

use std::io;

use crate::application::{ApplicationError, ApplicationResult};
use crate::infrastructure::InfraResult;

/// Extension trait for converting `InfraResult` from a [`RepositoryHost`] call.
///
/// [`RepositoryHost`]: crate::infrastructure::traits::RepositoryHost
pub trait HostResultExt<T> {
    /// Add the action and its target to a hosting-API error.
    ///
    /// # Example
    /// ```ignore
    /// host.default_branch(&token, org, repo)
    ///     .with_host_context("get repository", repo)?;
    /// ```
    fn with_host_context(self, action: &str, target: &str) -> ApplicationResult<T>;
}

impl<T> HostResultExt<T> for InfraResult<T> {
    fn with_host_context(self, action: &str, target: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::HostingApi {
            context: format!("{action} {target}"),
            source: Box::new(e),
        })
    }
}

/// Extension trait for converting `io::Result` of a subprocess call.
pub trait IoResultExt<T> {
    /// Add the action and program name to an I/O error.
    fn with_command_context(self, action: &str, program: &str) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_command_context(self, action: &str, program: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{action}: {program}"),
            source: Box::new(e),
        })
    }
}
