//! Tests for token providers backed by a helper command or the environment
#![cfg(unix)]

mod common;

use std::sync::Arc;

use common::{test_settings, MockCommandRunner};
use weave_lease::config::Settings;
use weave_lease::infrastructure::token::{
    ChainTokenProvider, CommandTokenProvider, EnvTokenProvider,
};
use weave_lease::infrastructure::traits::TokenProvider;

#[test]
fn given_gh_prints_token_when_resolving_then_returns_trimmed_token() {
    // Arrange
    let runner = Arc::new(MockCommandRunner::default().with_program("gh", 0, "gho_abc123\n"));
    let provider = CommandTokenProvider::gh(runner.clone());

    // Act
    let token = provider.resolve_token().expect("token");

    // Assert
    assert_eq!(token.secret(), "gho_abc123");
    let calls = runner.invocations();
    assert_eq!(calls[0].0, "gh");
    assert_eq!(calls[0].1, vec!["auth", "token"]);
}

#[test]
fn given_gh_not_logged_in_when_resolving_then_none() {
    let runner = Arc::new(MockCommandRunner::default().with_program("gh", 1, ""));
    let provider = CommandTokenProvider::gh(runner);

    assert!(provider.resolve_token().is_none());
}

#[test]
fn given_gh_not_installed_when_resolving_then_none() {
    let runner = Arc::new(MockCommandRunner::default());
    let provider = CommandTokenProvider::gh(runner);

    assert!(provider.resolve_token().is_none());
}

#[test]
fn given_gh_prints_nothing_when_resolving_then_none() {
    let runner = Arc::new(MockCommandRunner::default().with_program("gh", 0, "  \n"));
    let provider = CommandTokenProvider::gh(runner);

    assert!(provider.resolve_token().is_none());
}

#[test]
fn given_empty_command_line_when_resolving_then_none_without_running() {
    let runner = Arc::new(MockCommandRunner::default());
    let provider = CommandTokenProvider::new(runner.clone(), "   ");

    assert!(provider.resolve_token().is_none());
    assert!(runner.invocations().is_empty());
}

#[test]
fn given_token_env_set_when_resolving_chain_then_env_wins_over_command() {
    // Arrange
    let var = "WEAVE_LEASE_TEST_TOKEN_CHAIN";
    std::env::set_var(var, "from-env");
    let runner = Arc::new(MockCommandRunner::default().with_program("gh", 0, "from-gh"));
    let settings = Settings {
        token_env: Some(var.into()),
        ..test_settings()
    };
    let chain = ChainTokenProvider::from_settings(&settings, runner.clone());

    // Act
    let token = chain.resolve_token().expect("token");

    // Assert
    assert_eq!(token.secret(), "from-env");
    assert!(runner.invocations().is_empty(), "command not consulted");
    std::env::remove_var(var);
}

#[test]
fn given_token_env_unset_when_resolving_chain_then_falls_back_to_command() {
    let var = "WEAVE_LEASE_TEST_TOKEN_UNSET";
    std::env::remove_var(var);
    let runner = Arc::new(MockCommandRunner::default().with_program("gh", 0, "from-gh\n"));
    let settings = Settings {
        token_env: Some(var.into()),
        ..test_settings()
    };
    let chain = ChainTokenProvider::from_settings(&settings, runner);

    assert_eq!(chain.resolve_token().unwrap().secret(), "from-gh");
}

#[test]
fn given_custom_token_command_when_resolving_then_runs_it() {
    let runner = Arc::new(MockCommandRunner::default().with_program("pass", 0, "s3cret"));
    let settings = Settings {
        token_command: "pass show github/token".into(),
        ..test_settings()
    };
    let chain = ChainTokenProvider::from_settings(&settings, runner.clone());

    assert_eq!(chain.resolve_token().unwrap().secret(), "s3cret");
    assert_eq!(runner.invocations()[0].1, vec!["show", "github/token"]);
}

#[test]
fn given_env_provider_when_var_blank_then_none() {
    let var = "WEAVE_LEASE_TEST_TOKEN_BLANK";
    std::env::set_var(var, " ");
    let provider = EnvTokenProvider::new(var);

    assert!(provider.resolve_token().is_none());
    std::env::remove_var(var);
}
