//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::process::{ExitStatus, Output};

use crate::domain::AccessToken;
use crate::infrastructure::InfraResult;

/// External command runner abstraction.
pub trait CommandRunner: Send + Sync {
    /// Run a command with arguments and capture its output.
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output>;

    /// Run a command, feeding `stdin` to it, and capture its output.
    fn run_with_stdin(&self, cmd: &str, args: &[&str], stdin: &str) -> io::Result<Output>;

    /// Run a command attached to the current terminal.
    /// Blocks until the command exits.
    fn run_attached(&self, cmd: &str, args: &[&str]) -> io::Result<ExitStatus>;
}

/// Item for FZF-style selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionItem {
    /// Display text shown in selector
    pub display: String,
    /// Actual value (e.g., repository name)
    pub value: String,
}

impl SelectionItem {
    /// Item whose display text is its value.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            display: value.clone(),
            value,
        }
    }
}

/// Interactive FZF-style selector abstraction.
pub trait Selector: Send + Sync {
    /// Present items to user and return selected one.
    /// Returns None if user cancels (Esc/Ctrl-C).
    fn select_one(
        &self,
        items: &[SelectionItem],
        prompt: &str,
    ) -> Result<Option<SelectionItem>, String>;
}

/// Source of a hosting-platform token.
pub trait TokenProvider: Send + Sync {
    /// Resolve a token. Failures are swallowed and reported as `None`.
    fn resolve_token(&self) -> Option<AccessToken>;
}

/// Read access to repositories of a hosting platform.
pub trait RepositoryHost: Send + Sync {
    /// Names of all repositories of `org`, across all pages, in API order.
    fn list_repositories(&self, token: &AccessToken, org: &str) -> InfraResult<Vec<String>>;

    /// Default branch of a repository, if the platform reports one.
    fn default_branch(
        &self,
        token: &AccessToken,
        org: &str,
        repo: &str,
    ) -> InfraResult<Option<String>>;

    /// Decoded text of a file at `git_ref`.
    ///
    /// `Ok(None)` when the response carries no file content (e.g. a directory).
    fn file_contents(
        &self,
        token: &AccessToken,
        org: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> InfraResult<Option<String>>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real command runner implementation.
#[derive(Debug, Default)]
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output> {
        std::process::Command::new(cmd).args(args).output()
    }

    fn run_with_stdin(&self, cmd: &str, args: &[&str], stdin: &str) -> io::Result<Output> {
        use std::io::Write;
        use std::process::Stdio;

        let mut child = std::process::Command::new(cmd)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut child_stdin) = child.stdin.take() {
            child_stdin.write_all(stdin.as_bytes())?;
        }

        child.wait_with_output()
    }

    fn run_attached(&self, cmd: &str, args: &[&str]) -> io::Result<ExitStatus> {
        std::process::Command::new(cmd).args(args).status()
    }
}

/// Real selector implementation using skim (FZF-like).
#[derive(Debug, Default)]
pub struct SkimSelector;

impl Selector for SkimSelector {
    fn select_one(
        &self,
        items: &[SelectionItem],
        prompt: &str,
    ) -> Result<Option<SelectionItem>, String> {
        use skim::prelude::*;
        use std::io::Cursor;

        if items.is_empty() {
            return Ok(None);
        }

        // Build input as newline-separated display strings
        let input = items
            .iter()
            .map(|i| i.display.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!("{prompt}> ");
        let options = SkimOptionsBuilder::default()
            .prompt(Some(prompt.as_str()))
            .height(Some("50%"))
            .multi(false)
            .build()
            .map_err(|e| format!("failed to build skim options: {e}"))?;

        let item_reader = SkimItemReader::default();
        let items_arc = item_reader.of_bufread(Cursor::new(input));

        let output = Skim::run_with(&options, Some(items_arc));

        match output {
            Some(out) if out.is_abort => Ok(None),
            Some(out) => {
                if let Some(selected) = out.selected_items.first() {
                    let display = selected.output().to_string();
                    let item = items.iter().find(|i| i.display == display).cloned();
                    Ok(item)
                } else {
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }
}
