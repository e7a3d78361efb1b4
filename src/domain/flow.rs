//! Lease generation flow as an explicit state machine.
//!
//! ```text
//! Idle -> TokenResolved -> RepoListed -> RepoChosen -> ManifestFetched
//!      -> EnvListed -> EnvChosen -> FieldsResolved -> CommandPresented
//! ```
//!
//! `TokenResolved -> RepoChosen` is allowed when the repository was given
//! up front. Any stage can halt; a halted flow accepts no further moves.

use std::fmt;

use crate::domain::error::DomainError;
use crate::domain::manifest::DatabaseField;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeaseStage {
    Idle,
    TokenResolved,
    RepoListed,
    RepoChosen,
    ManifestFetched,
    EnvListed,
    EnvChosen,
    FieldsResolved,
    CommandPresented,
}

impl LeaseStage {
    pub fn can_advance_to(self, next: LeaseStage) -> bool {
        use LeaseStage::*;
        matches!(
            (self, next),
            (Idle, TokenResolved)
                | (TokenResolved, RepoListed)
                | (TokenResolved, RepoChosen)
                | (RepoListed, RepoChosen)
                | (RepoChosen, ManifestFetched)
                | (ManifestFetched, EnvListed)
                | (EnvListed, EnvChosen)
                | (EnvChosen, FieldsResolved)
                | (FieldsResolved, CommandPresented)
        )
    }
}

impl fmt::Display for LeaseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::TokenResolved => "token-resolved",
            Self::RepoListed => "repo-listed",
            Self::RepoChosen => "repo-chosen",
            Self::ManifestFetched => "manifest-fetched",
            Self::EnvListed => "env-listed",
            Self::EnvChosen => "env-chosen",
            Self::FieldsResolved => "fields-resolved",
            Self::CommandPresented => "command-presented",
        };
        f.write_str(name)
    }
}

/// Why the flow stopped before presenting a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HaltReason {
    MissingCredential,
    NoRepositories {
        org: String,
    },
    ManifestNotFound {
        repository: String,
        path: String,
    },
    NoEnvironments {
        path: String,
    },
    UnknownEnvironment {
        environment: String,
        path: String,
    },
    UnresolvedDatabase {
        environment: String,
        path: String,
        missing: Vec<DatabaseField>,
    },
    /// A picker was dismissed. Not reported to the user.
    Cancelled,
}

impl HaltReason {
    /// User-facing message; `None` for silent halts.
    pub fn message(&self) -> Option<String> {
        let msg = match self {
            Self::MissingCredential => {
                "Could not retrieve GitHub token. Please run `gh auth login` first.".to_string()
            }
            Self::NoRepositories { org } => format!("No repos found for org {org}"),
            Self::ManifestNotFound { repository, path } => {
                format!("{path} not found in {repository}")
            }
            Self::NoEnvironments { path } => format!("No environments found in {path}"),
            Self::UnknownEnvironment { environment, path } => {
                format!("Environment {environment} not found in {path}")
            }
            Self::UnresolvedDatabase {
                environment,
                path,
                missing,
            } => {
                let missing: Vec<&str> = missing.iter().map(|f| f.entry_key()).collect();
                format!(
                    "Could not extract database info from {path} for {environment} (missing: {})",
                    missing.join(", ")
                )
            }
            Self::Cancelled => return None,
        };
        Some(msg)
    }

    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Terminal "reported and stopped" state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Halt {
    /// Last stage reached before stopping
    pub stage: LeaseStage,
    pub reason: HaltReason,
}

impl fmt::Display for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason.message() {
            Some(msg) => f.write_str(&msg),
            None => write!(f, "cancelled at {}", self.stage),
        }
    }
}

/// Tracks the current stage of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseFlow {
    stage: LeaseStage,
    halted: bool,
}

impl Default for LeaseFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaseFlow {
    pub fn new() -> Self {
        Self {
            stage: LeaseStage::Idle,
            halted: false,
        }
    }

    pub fn stage(&self) -> LeaseStage {
        self.stage
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn advance(&mut self, next: LeaseStage) -> Result<(), DomainError> {
        if self.halted {
            return Err(DomainError::FlowStopped(self.stage));
        }
        if !self.stage.can_advance_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.stage,
                to: next,
            });
        }
        self.stage = next;
        Ok(())
    }

    /// Stop at the current stage.
    pub fn halt(&mut self, reason: HaltReason) -> Halt {
        self.halted = true;
        Halt {
            stage: self.stage,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn given_new_flow_when_walking_happy_path_then_reaches_command_presented() {
        let mut flow = LeaseFlow::new();
        for next in [
            LeaseStage::TokenResolved,
            LeaseStage::RepoListed,
            LeaseStage::RepoChosen,
            LeaseStage::ManifestFetched,
            LeaseStage::EnvListed,
            LeaseStage::EnvChosen,
            LeaseStage::FieldsResolved,
            LeaseStage::CommandPresented,
        ] {
            flow.advance(next).unwrap();
        }
        assert_eq!(flow.stage(), LeaseStage::CommandPresented);
    }

    #[rstest]
    #[case(LeaseStage::Idle, LeaseStage::RepoListed)]
    #[case(LeaseStage::RepoListed, LeaseStage::ManifestFetched)]
    #[case(LeaseStage::EnvListed, LeaseStage::FieldsResolved)]
    #[case(LeaseStage::CommandPresented, LeaseStage::Idle)]
    fn given_skipped_stage_when_advancing_then_rejected(
        #[case] from: LeaseStage,
        #[case] to: LeaseStage,
    ) {
        assert!(!from.can_advance_to(to));
    }

    #[test]
    fn given_preselected_repo_when_advancing_then_listing_can_be_skipped() {
        assert!(LeaseStage::TokenResolved.can_advance_to(LeaseStage::RepoChosen));
    }

    #[test]
    fn given_halted_flow_when_advancing_then_fails() {
        let mut flow = LeaseFlow::new();
        flow.advance(LeaseStage::TokenResolved).unwrap();
        let halt = flow.halt(HaltReason::NoRepositories { org: "o".into() });

        assert_eq!(halt.stage, LeaseStage::TokenResolved);
        assert_eq!(
            flow.advance(LeaseStage::RepoListed),
            Err(DomainError::FlowStopped(LeaseStage::TokenResolved))
        );
    }

    #[test]
    fn given_cancelled_when_asking_for_message_then_silent() {
        assert!(HaltReason::Cancelled.message().is_none());
        assert!(HaltReason::Cancelled.is_silent());
    }

    #[test]
    fn given_unresolved_database_when_formatting_then_lists_missing_fields() {
        let reason = HaltReason::UnresolvedDatabase {
            environment: "dev".into(),
            path: ".weave.yaml".into(),
            missing: vec![DatabaseField::Schema],
        };
        assert_eq!(
            reason.message().unwrap(),
            "Could not extract database info from .weave.yaml for dev (missing: schema)"
        );
    }
}
