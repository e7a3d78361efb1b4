//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/weave-lease/weave-lease.toml`
//!    (or the file passed with `--config`)
//! 3. Environment variables: `WEAVE_LEASE_*` prefix
//! 4. CLI flags (applied by the caller)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::expand_env_vars;
use crate::infrastructure::token::DEFAULT_TOKEN_COMMAND;

/// Largest page size the GitHub listing API accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Unified configuration for weave-lease.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// GitHub organization whose repositories are offered
    pub org: String,
    /// GitHub REST API base URL
    pub api_url: String,
    /// Manifest location inside each repository
    pub manifest_path: String,
    /// Repositories requested per listing page
    pub page_size: u32,
    /// Branch used when the repository reports no default branch
    pub fallback_branch: String,
    /// Command printing a GitHub token on stdout
    pub token_command: String,
    /// Environment variable checked for a token before `token_command`
    pub token_env: Option<String>,
    /// Command receiving the lease command on stdin (default: auto-detect)
    pub clipboard_command: Option<String>,
    /// Shell used to run the lease command
    pub shell: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            org: "weave-lab".into(),
            api_url: "https://api.github.com".into(),
            manifest_path: ".weave.yaml".into(),
            page_size: MAX_PAGE_SIZE,
            fallback_branch: "main".into(),
            token_command: DEFAULT_TOKEN_COMMAND.into(),
            token_env: None,
            clipboard_command: None,
            shell: "sh".into(),
        }
    }
}

/// Raw settings for intermediate parsing (`None` = not specified).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub org: Option<String>,
    pub api_url: Option<String>,
    pub manifest_path: Option<String>,
    pub page_size: Option<u32>,
    pub fallback_branch: Option<String>,
    pub token_command: Option<String>,
    pub token_env: Option<String>,
    pub clipboard_command: Option<String>,
    pub shell: Option<String>,
}

/// Get the XDG config directory for weave-lease.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "weave-lease").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("weave-lease.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like and command fields.
    fn expand_paths(&mut self) {
        self.token_command = expand_env_vars(&self.token_command);
        self.shell = expand_env_vars(&self.shell);
        if let Some(cmd) = self.clipboard_command.as_mut() {
            *cmd = expand_env_vars(cmd);
        }
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            org: overlay.org.clone().unwrap_or_else(|| self.org.clone()),
            api_url: overlay
                .api_url
                .clone()
                .unwrap_or_else(|| self.api_url.clone()),
            manifest_path: overlay
                .manifest_path
                .clone()
                .unwrap_or_else(|| self.manifest_path.clone()),
            page_size: overlay.page_size.unwrap_or(self.page_size),
            fallback_branch: overlay
                .fallback_branch
                .clone()
                .unwrap_or_else(|| self.fallback_branch.clone()),
            token_command: overlay
                .token_command
                .clone()
                .unwrap_or_else(|| self.token_command.clone()),
            token_env: overlay.token_env.clone().or_else(|| self.token_env.clone()),
            clipboard_command: overlay
                .clipboard_command
                .clone()
                .or_else(|| self.clipboard_command.clone()),
            shell: overlay.shell.clone().unwrap_or_else(|| self.shell.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Explicit config file; replaces the global file when given
    ///   and must exist.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        match config_file {
            Some(path) => {
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
            None => {
                if let Some(global_path) = global_config_path() {
                    if global_path.exists() {
                        let raw = load_raw_settings(&global_path)?;
                        current = current.merge_with(&raw);
                    }
                }
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.page_size = current.page_size.clamp(1, MAX_PAGE_SIZE);

        Ok(current)
    }

    /// Apply WEAVE_LEASE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("WEAVE_LEASE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("org") {
            settings.org = val;
        }
        if let Ok(val) = config.get_string("api_url") {
            settings.api_url = val;
        }
        if let Ok(val) = config.get_string("manifest_path") {
            settings.manifest_path = val;
        }
        if let Ok(val) = config.get_int("page_size") {
            settings.page_size = u32::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("WEAVE_LEASE_PAGE_SIZE out of range: {val}"),
            })?;
        }
        if let Ok(val) = config.get_string("fallback_branch") {
            settings.fallback_branch = val;
        }
        if let Ok(val) = config.get_string("token_command") {
            settings.token_command = val;
        }
        if let Ok(val) = config.get_string("token_env") {
            settings.token_env = Some(val);
        }
        if let Ok(val) = config.get_string("clipboard_command") {
            settings.clipboard_command = Some(val);
        }
        if let Ok(val) = config.get_string("shell") {
            settings.shell = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# weave-lease configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/weave-lease/weave-lease.toml  (or --config PATH)
#   Env:    WEAVE_LEASE_* environment variables     (explicit overrides)
#   CLI:    --org

# GitHub organization whose repositories are listed
# org = "weave-lab"

# GitHub REST API base URL (GitHub Enterprise: https://HOST/api/v3)
# api_url = "https://api.github.com"

# Manifest location inside each repository
# manifest_path = ".weave.yaml"

# Repositories per listing page (1-100)
# page_size = 100

# Branch used when a repository reports no default branch
# fallback_branch = "main"

# Command printing a GitHub token on stdout
# token_command = "gh auth token"

# Environment variable checked for a token before token_command
# token_env = "GH_TOKEN"

# Command receiving the lease command on stdin
# (default: first available of pbcopy, wl-copy, xclip)
# clipboard_command = "xclip -selection clipboard"

# Shell used by `generate --run`
# shell = "sh"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
