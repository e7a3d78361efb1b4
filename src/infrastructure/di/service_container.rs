//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{DeliveryService, LeaseService};
use crate::config::Settings;
use crate::infrastructure::github::GitHubClient;
use crate::infrastructure::token::ChainTokenProvider;
use crate::infrastructure::traits::{
    CommandRunner, RealCommandRunner, RepositoryHost, Selector, SkimSelector, TokenProvider,
};

/// Container holding all I/O dependencies and building services from them.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Command runner abstraction
    pub cmd: Arc<dyn CommandRunner>,

    /// Interactive picker
    pub selector: Arc<dyn Selector>,

    /// Token source
    pub tokens: Arc<dyn TokenProvider>,

    /// Hosting platform
    pub host: Arc<dyn RepositoryHost>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let cmd: Arc<dyn CommandRunner> = Arc::new(RealCommandRunner);
        let tokens = Arc::new(ChainTokenProvider::from_settings(&settings, cmd.clone()));
        let host = Arc::new(GitHubClient::from_settings(&settings));
        Self::with_deps(settings, cmd, Arc::new(SkimSelector), tokens, host)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        cmd: Arc<dyn CommandRunner>,
        selector: Arc<dyn Selector>,
        tokens: Arc<dyn TokenProvider>,
        host: Arc<dyn RepositoryHost>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            cmd,
            selector,
            tokens,
            host,
        }
    }

    pub fn lease_service(&self) -> LeaseService {
        LeaseService::new(
            self.settings.clone(),
            self.tokens.clone(),
            self.host.clone(),
            self.selector.clone(),
        )
    }

    pub fn delivery_service(&self) -> DeliveryService {
        DeliveryService::new(
            self.cmd.clone(),
            self.selector.clone(),
            self.settings.clone(),
        )
    }
}
