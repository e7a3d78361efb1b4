//! Shared mocks for weave-lease integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex};

use weave_lease::config::Settings;
use weave_lease::domain::AccessToken;
use weave_lease::infrastructure::di::ServiceContainer;
use weave_lease::infrastructure::traits::{
    CommandRunner, RepositoryHost, SelectionItem, Selector, TokenProvider,
};
use weave_lease::infrastructure::{InfraError, InfraResult};

pub const ORG: &str = "weave-lab";

/// Token provider returning a fixed answer.
pub struct MockTokens(pub Option<&'static str>);

impl TokenProvider for MockTokens {
    fn resolve_token(&self) -> Option<AccessToken> {
        self.0.and_then(AccessToken::parse)
    }
}

/// In-memory hosting platform recording every call.
#[derive(Default)]
pub struct MockHost {
    pub repos: Vec<String>,
    pub branches: HashMap<String, String>,
    /// (repo, ref) -> manifest text
    pub files: HashMap<(String, String), String>,
    pub fail_metadata: bool,
    pub calls: Mutex<Vec<String>>,
}

impl MockHost {
    pub fn with_repos(repos: &[&str]) -> Self {
        Self {
            repos: repos.iter().map(|r| r.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Serve `text` as the manifest of `repo` on branch `main`.
    pub fn with_manifest(mut self, repo: &str, text: &str) -> Self {
        self.branches.insert(repo.into(), "main".into());
        self.files
            .insert((repo.into(), "main".into()), text.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl RepositoryHost for MockHost {
    fn list_repositories(&self, _token: &AccessToken, org: &str) -> InfraResult<Vec<String>> {
        self.record(format!("list {org}"));
        Ok(self.repos.clone())
    }

    fn default_branch(
        &self,
        _token: &AccessToken,
        org: &str,
        repo: &str,
    ) -> InfraResult<Option<String>> {
        self.record(format!("repo {org}/{repo}"));
        if self.fail_metadata {
            return Err(InfraError::Http {
                message: format!("GET /repos/{org}/{repo}: HTTP 404"),
                status: Some(404),
            });
        }
        Ok(self.branches.get(repo).cloned())
    }

    fn file_contents(
        &self,
        _token: &AccessToken,
        org: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> InfraResult<Option<String>> {
        self.record(format!("contents {org}/{repo}/{path}@{git_ref}"));
        self.files
            .get(&(repo.to_string(), git_ref.to_string()))
            .cloned()
            .map(Some)
            .ok_or_else(|| InfraError::Http {
                message: "HTTP 404".into(),
                status: Some(404),
            })
    }
}

/// Selector answering prompts from a script of values; `None` cancels.
#[derive(Default)]
pub struct ScriptedSelector {
    answers: Mutex<Vec<Option<String>>>,
    /// (prompt, offered values) per call
    pub seen: Mutex<Vec<(String, Vec<String>)>>,
}

impl ScriptedSelector {
    pub fn new(answers: &[Option<&str>]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().rev().map(|a| a.map(str::to_string)).collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<(String, Vec<String>)> {
        self.seen.lock().unwrap().clone()
    }
}

impl Selector for ScriptedSelector {
    fn select_one(
        &self,
        items: &[SelectionItem],
        prompt: &str,
    ) -> Result<Option<SelectionItem>, String> {
        self.seen.lock().unwrap().push((
            prompt.to_string(),
            items.iter().map(|i| i.value.clone()).collect(),
        ));
        let answer = self
            .answers
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| format!("unexpected prompt: {prompt}"))?;
        match answer {
            Some(value) => items
                .iter()
                .find(|i| i.value == value)
                .cloned()
                .map(Some)
                .ok_or_else(|| format!("{value} not offered")),
            None => Ok(None),
        }
    }
}

/// Command runner replaying canned results and recording invocations.
#[derive(Default)]
pub struct MockCommandRunner {
    /// program -> (exit code, stdout); programs not listed fail to spawn
    pub programs: HashMap<String, (i32, String)>,
    /// (program, args, stdin)
    pub invocations: Mutex<Vec<(String, Vec<String>, Option<String>)>>,
}

impl MockCommandRunner {
    pub fn with_program(mut self, program: &str, code: i32, stdout: &str) -> Self {
        self.programs
            .insert(program.into(), (code, stdout.to_string()));
        self
    }

    pub fn invocations(&self) -> Vec<(String, Vec<String>, Option<String>)> {
        self.invocations.lock().unwrap().clone()
    }

    fn invoke(&self, cmd: &str, args: &[&str], stdin: Option<&str>) -> io::Result<(i32, String)> {
        self.invocations.lock().unwrap().push((
            cmd.to_string(),
            args.iter().map(|a| a.to_string()).collect(),
            stdin.map(str::to_string),
        ));
        self.programs
            .get(cmd)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{cmd}: not found")))
    }
}

impl CommandRunner for MockCommandRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output> {
        let (code, stdout) = self.invoke(cmd, args, None)?;
        Ok(output(code, &stdout))
    }

    fn run_with_stdin(&self, cmd: &str, args: &[&str], stdin: &str) -> io::Result<Output> {
        let (code, stdout) = self.invoke(cmd, args, Some(stdin))?;
        Ok(output(code, &stdout))
    }

    fn run_attached(&self, cmd: &str, args: &[&str]) -> io::Result<ExitStatus> {
        let (code, _) = self.invoke(cmd, args, None)?;
        Ok(exit_status(code))
    }
}

#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

pub fn output(code: i32, stdout: &str) -> Output {
    Output {
        status: exit_status(code),
        stdout: stdout.as_bytes().to_vec(),
        stderr: if code == 0 { Vec::new() } else { b"failed".to_vec() },
    }
}

pub fn test_settings() -> Settings {
    Settings {
        org: ORG.into(),
        ..Settings::default()
    }
}

/// Container wired with mocks.
pub fn container(
    tokens: MockTokens,
    host: Arc<MockHost>,
    selector: Arc<ScriptedSelector>,
    cmd: Arc<MockCommandRunner>,
) -> ServiceContainer {
    ServiceContainer::with_deps(test_settings(), cmd, selector, Arc::new(tokens), host)
}

pub const PROD_MANIFEST: &str = r#"
deploy:
  prod:
    databases:
      - hostname: sql1
        name: orders
        schema: public
"#;

pub const DEV_FALLBACK_MANIFEST: &str = r#"
deploy:
  dev:
    databases:
      - {}
defaults:
  - env:
      - name: CLOUDSQL_HOST
        value: localhost
      - name: CLOUDSQL_DATABASE
        value: app
      - name: CLOUDSQL_SCHEMA
        value: public
"#;
