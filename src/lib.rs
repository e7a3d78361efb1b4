//! Generate `bart database lease request` commands from the `.weave.yaml`
//! deployment manifests of a GitHub organization's repositories.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
