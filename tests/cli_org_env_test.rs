//! `--org` versus WEAVE_LEASE_ORG (own test binary: mutates process env)

use std::fs;

use clap::Parser;
use tempfile::TempDir;

use weave_lease::cli::args::Cli;
use weave_lease::cli::commands::load_settings;

#[test]
fn given_org_env_var_when_loading_then_read_once_by_settings_and_flag_wins() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("weave-lease.toml");
    fs::write(&config, "org = \"from-file\"\n").unwrap();
    let config = config.to_string_lossy().into_owned();
    std::env::set_var("WEAVE_LEASE_ORG", "from-env");

    // Act
    let without_flag = Cli::try_parse_from(["weave-lease", "--config", &config, "repos"]).unwrap();
    let with_flag =
        Cli::try_parse_from(["weave-lease", "--config", &config, "--org", "from-flag", "repos"])
            .unwrap();
    let env_settings = load_settings(&without_flag);
    let flag_settings = load_settings(&with_flag);
    std::env::remove_var("WEAVE_LEASE_ORG");

    // Assert: the flag does not read the variable itself
    assert_eq!(without_flag.org, None);
    assert_eq!(env_settings.unwrap().org, "from-env");
    assert_eq!(flag_settings.unwrap().org, "from-flag");
}
