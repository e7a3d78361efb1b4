//! Lease command generation service
//!
//! Drives the whole flow: token, repository listing and choice, manifest
//! fetch, environment choice, field resolution and command formatting.
//! Every early stop is an [`ApplicationError::Halted`] carrying the stage
//! the flow reached.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, HostResultExt};
use crate::config::Settings;
use crate::domain::{
    AccessToken, HaltReason, LeaseCommand, LeaseFlow, LeaseStage, Manifest, ResolveError,
};
use crate::infrastructure::traits::{RepositoryHost, SelectionItem, Selector, TokenProvider};

pub const REPOSITORY_PROMPT: &str = "Select a service repo";
pub const ENVIRONMENT_PROMPT: &str = "Select environment (e.g. dev or prod)";

/// Choices made up front; `None` means "ask interactively".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaseRequest {
    pub repository: Option<String>,
    pub environment: Option<String>,
}

/// A generated lease command with the choices that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedLease {
    pub repository: String,
    pub environment: String,
    pub command: LeaseCommand,
}

/// Service generating lease commands from repository manifests.
pub struct LeaseService {
    settings: Arc<Settings>,
    tokens: Arc<dyn TokenProvider>,
    host: Arc<dyn RepositoryHost>,
    selector: Arc<dyn Selector>,
}

impl LeaseService {
    pub fn new(
        settings: Arc<Settings>,
        tokens: Arc<dyn TokenProvider>,
        host: Arc<dyn RepositoryHost>,
        selector: Arc<dyn Selector>,
    ) -> Self {
        Self {
            settings,
            tokens,
            host,
            selector,
        }
    }

    /// Run the full flow and return the generated command.
    #[instrument(skip(self))]
    pub fn generate(&self, request: &LeaseRequest) -> ApplicationResult<GeneratedLease> {
        let mut flow = LeaseFlow::new();
        let org = self.settings.org.as_str();
        let manifest_path = self.settings.manifest_path.as_str();

        let Some(token) = self.tokens.resolve_token() else {
            return Err(stop(&mut flow, HaltReason::MissingCredential));
        };
        flow.advance(LeaseStage::TokenResolved)?;

        let repository = match &request.repository {
            Some(repo) => repo.clone(),
            None => {
                let repos = self.list_repositories(&token, org)?;
                if repos.is_empty() {
                    return Err(stop(
                        &mut flow,
                        HaltReason::NoRepositories { org: org.into() },
                    ));
                }
                flow.advance(LeaseStage::RepoListed)?;
                match self.pick(&repos, REPOSITORY_PROMPT)? {
                    Some(repo) => repo,
                    None => return Err(stop(&mut flow, HaltReason::Cancelled)),
                }
            }
        };
        flow.advance(LeaseStage::RepoChosen)?;
        debug!("generate: repository={}", repository);

        let Some(manifest) = self.load_manifest(&token, &repository)? else {
            return Err(stop(
                &mut flow,
                HaltReason::ManifestNotFound {
                    repository,
                    path: manifest_path.into(),
                },
            ));
        };
        flow.advance(LeaseStage::ManifestFetched)?;

        let environments: Vec<String> = manifest
            .environment_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        if environments.is_empty() {
            return Err(stop(
                &mut flow,
                HaltReason::NoEnvironments {
                    path: manifest_path.into(),
                },
            ));
        }
        flow.advance(LeaseStage::EnvListed)?;

        let environment = match &request.environment {
            Some(env) if environments.contains(env) => env.clone(),
            Some(env) => {
                return Err(stop(
                    &mut flow,
                    HaltReason::UnknownEnvironment {
                        environment: env.clone(),
                        path: manifest_path.into(),
                    },
                ))
            }
            None => match self.pick(&environments, ENVIRONMENT_PROMPT)? {
                Some(env) => env,
                None => return Err(stop(&mut flow, HaltReason::Cancelled)),
            },
        };
        flow.advance(LeaseStage::EnvChosen)?;
        debug!("generate: environment={}", environment);

        let params = match manifest.resolve(&environment) {
            Ok(params) => params,
            Err(ResolveError::Unresolved { missing, .. }) => {
                return Err(stop(
                    &mut flow,
                    HaltReason::UnresolvedDatabase {
                        environment,
                        path: manifest_path.into(),
                        missing,
                    },
                ))
            }
            Err(ResolveError::UnknownEnvironment(environment)) => {
                return Err(stop(
                    &mut flow,
                    HaltReason::UnknownEnvironment {
                        environment,
                        path: manifest_path.into(),
                    },
                ))
            }
        };
        flow.advance(LeaseStage::FieldsResolved)?;

        let command = LeaseCommand::from(params);
        flow.advance(LeaseStage::CommandPresented)?;

        Ok(GeneratedLease {
            repository,
            environment,
            command,
        })
    }

    /// All repositories of the configured organization, sorted by name.
    #[instrument(skip(self))]
    pub fn repositories(&self) -> ApplicationResult<Vec<String>> {
        let mut flow = LeaseFlow::new();
        let Some(token) = self.tokens.resolve_token() else {
            return Err(stop(&mut flow, HaltReason::MissingCredential));
        };
        flow.advance(LeaseStage::TokenResolved)?;

        let repos = self.list_repositories(&token, &self.settings.org)?;
        if repos.is_empty() {
            return Err(stop(
                &mut flow,
                HaltReason::NoRepositories {
                    org: self.settings.org.clone(),
                },
            ));
        }
        Ok(repos)
    }

    /// Environment names defined in a repository's manifest.
    #[instrument(skip(self))]
    pub fn environments(&self, repository: &str) -> ApplicationResult<Vec<String>> {
        let mut flow = LeaseFlow::new();
        let manifest_path = self.settings.manifest_path.as_str();
        let Some(token) = self.tokens.resolve_token() else {
            return Err(stop(&mut flow, HaltReason::MissingCredential));
        };
        flow.advance(LeaseStage::TokenResolved)?;
        flow.advance(LeaseStage::RepoChosen)?;

        let Some(manifest) = self.load_manifest(&token, repository)? else {
            return Err(stop(
                &mut flow,
                HaltReason::ManifestNotFound {
                    repository: repository.into(),
                    path: manifest_path.into(),
                },
            ));
        };
        flow.advance(LeaseStage::ManifestFetched)?;

        let environments: Vec<String> = manifest
            .environment_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        if environments.is_empty() {
            return Err(stop(
                &mut flow,
                HaltReason::NoEnvironments {
                    path: manifest_path.into(),
                },
            ));
        }
        Ok(environments)
    }

    /// Repository names of `org`, sorted ascending.
    pub fn list_repositories(&self, token: &AccessToken, org: &str) -> ApplicationResult<Vec<String>> {
        let mut repos = self
            .host
            .list_repositories(token, org)
            .with_host_context("list repositories of", org)?;
        repos.sort();
        debug!("list_repositories: {} repos in {}", repos.len(), org);
        Ok(repos)
    }

    /// Manifest text from the repository's default branch.
    ///
    /// Failing to read the file (missing, wrong branch, permissions, network)
    /// yields `None`; the cause is only logged. A response without content
    /// (e.g. a directory) and an empty file also yield `None`, so they are
    /// reported as "not found" instead of ending the flow silently.
    /// Failing to read repository metadata is an error.
    pub fn fetch_manifest(
        &self,
        token: &AccessToken,
        repository: &str,
    ) -> ApplicationResult<Option<String>> {
        let org = self.settings.org.as_str();
        let branch = self
            .host
            .default_branch(token, org, repository)
            .with_host_context("get repository", repository)?
            .unwrap_or_else(|| self.settings.fallback_branch.clone());
        debug!("fetch_manifest: {}/{}@{}", org, repository, branch);

        match self.host.file_contents(
            token,
            org,
            repository,
            &self.settings.manifest_path,
            &branch,
        ) {
            Ok(Some(text)) if !text.is_empty() => Ok(Some(text)),
            Ok(_) => {
                debug!("fetch_manifest: no content for {}", repository);
                Ok(None)
            }
            Err(e) => {
                debug!("fetch_manifest: {} failed: {}", repository, e);
                Ok(None)
            }
        }
    }

    /// Fetch and parse the manifest; invalid YAML is an error.
    pub fn load_manifest(
        &self,
        token: &AccessToken,
        repository: &str,
    ) -> ApplicationResult<Option<Manifest>> {
        match self.fetch_manifest(token, repository)? {
            Some(text) => Ok(Some(Manifest::parse(&text)?)),
            None => Ok(None),
        }
    }

    fn pick(&self, values: &[String], prompt: &str) -> ApplicationResult<Option<String>> {
        let items: Vec<SelectionItem> = values.iter().map(SelectionItem::plain).collect();
        let selected = self
            .selector
            .select_one(&items, prompt)
            .map_err(|message| ApplicationError::Selection { message })?;
        Ok(selected.map(|item| item.value))
    }
}

fn stop(flow: &mut LeaseFlow, reason: HaltReason) -> ApplicationError {
    ApplicationError::Halted(flow.halt(reason))
}
