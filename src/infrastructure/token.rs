//! Token providers
//!
//! The default provider asks an authenticated CLI (`gh auth token`) for a
//! token. Every provider swallows its failures: a missing helper, a non-zero
//! exit or empty output all mean "no token".

use std::sync::Arc;

use tracing::debug;

use crate::config::Settings;
use crate::domain::AccessToken;
use crate::infrastructure::traits::{CommandRunner, TokenProvider};

/// Default token helper invocation.
pub const DEFAULT_TOKEN_COMMAND: &str = "gh auth token";

/// Runs a helper command and takes its trimmed stdout as the token.
pub struct CommandTokenProvider {
    cmd: Arc<dyn CommandRunner>,
    program: String,
    args: Vec<String>,
}

impl CommandTokenProvider {
    /// Build from a whitespace-separated command line, e.g. `gh auth token`.
    pub fn new(cmd: Arc<dyn CommandRunner>, command_line: &str) -> Self {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_default();
        Self {
            cmd,
            program,
            args: parts.collect(),
        }
    }

    pub fn gh(cmd: Arc<dyn CommandRunner>) -> Self {
        Self::new(cmd, DEFAULT_TOKEN_COMMAND)
    }
}

impl TokenProvider for CommandTokenProvider {
    fn resolve_token(&self) -> Option<AccessToken> {
        if self.program.is_empty() {
            return None;
        }
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        let output = match self.cmd.run(&self.program, &args) {
            Ok(output) => output,
            Err(e) => {
                debug!("token command {} not runnable: {}", self.program, e);
                return None;
            }
        };
        if !output.status.success() {
            debug!(
                "token command {} exited with {:?}",
                self.program,
                output.status.code()
            );
            return None;
        }
        AccessToken::parse(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Reads the token from an environment variable.
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl TokenProvider for EnvTokenProvider {
    fn resolve_token(&self) -> Option<AccessToken> {
        let value = std::env::var(&self.var).ok()?;
        debug!("token taken from ${}", self.var);
        AccessToken::parse(&value)
    }
}

/// Tries providers in order and returns the first token found.
pub struct ChainTokenProvider {
    providers: Vec<Arc<dyn TokenProvider>>,
}

impl ChainTokenProvider {
    pub fn new(providers: Vec<Arc<dyn TokenProvider>>) -> Self {
        Self { providers }
    }

    /// Provider chain described by settings: `token_env` first (if set),
    /// then `token_command`.
    pub fn from_settings(settings: &Settings, cmd: Arc<dyn CommandRunner>) -> Self {
        let mut providers: Vec<Arc<dyn TokenProvider>> = Vec::new();
        if let Some(var) = settings.token_env.as_deref().filter(|v| !v.is_empty()) {
            providers.push(Arc::new(EnvTokenProvider::new(var)));
        }
        providers.push(Arc::new(CommandTokenProvider::new(
            cmd,
            &settings.token_command,
        )));
        Self::new(providers)
    }
}

impl TokenProvider for ChainTokenProvider {
    fn resolve_token(&self) -> Option<AccessToken> {
        self.providers.iter().find_map(|p| p.resolve_token())
    }
}
