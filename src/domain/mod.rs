//! Domain layer: manifest model, lease command and flow states
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod credential;
pub mod error;
pub mod flow;
pub mod lease;
pub mod manifest;

pub use credential::AccessToken;
pub use error::DomainError;
pub use flow::{Halt, HaltReason, LeaseFlow, LeaseStage};
pub use lease::{LeaseCommand, LEASE_PROGRAM};
pub use manifest::{
    DatabaseEntry, DatabaseField, DatabaseParams, DefaultsBlock, DeployTarget, EnvVar,
    Environment, Manifest, ResolveError,
};

/// Expand `~`, `$VAR` and `${VAR}` in a setting value.
///
/// Falls back to the input unchanged if expansion fails.
pub fn expand_env_vars(value: &str) -> String {
    shellexpand::full(value)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| value.to_string())
}
