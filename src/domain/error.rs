//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::flow::LeaseStage;

/// Domain errors represent business logic violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid manifest: {message}")]
    InvalidManifest { message: String },

    #[error("invalid flow transition: {from} -> {to}")]
    InvalidTransition { from: LeaseStage, to: LeaseStage },

    #[error("flow already stopped at {0}")]
    FlowStopped(LeaseStage),
}
