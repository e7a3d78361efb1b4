//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (RepositoryHost, Selector, etc.)
//! but are themselves concrete structs, not traits.

mod delivery;
mod lease;

pub use delivery::{DeliveryService, LeaseAction, ACTION_PROMPT};
pub use lease::{
    GeneratedLease, LeaseRequest, LeaseService, ENVIRONMENT_PROMPT, REPOSITORY_PROMPT,
};
