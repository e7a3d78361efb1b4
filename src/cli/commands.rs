//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{GeneratedLease, LeaseAction, LeaseRequest};
use crate::cli::args::{Cli, Commands, ConfigCommands, GenerateArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::exitcode;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Load settings and apply CLI overrides.
pub fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(org) = &cli.org {
        settings.org = org.clone();
    }
    debug!("settings: org={}, api_url={}", settings.org, settings.api_url);
    Ok(settings)
}

/// Run the parsed command line and return the process exit code.
pub fn execute_command(cli: &Cli) -> CliResult<i32> {
    // completion and config paths work without loading settings
    match &cli.command {
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            return Ok(exitcode::OK);
        }
        Some(Commands::Config {
            command: ConfigCommands::Path,
        }) => return config_path(cli.config.as_deref()),
        Some(Commands::Config {
            command: ConfigCommands::Init { force },
        }) => return config_init(cli.config.as_deref(), *force),
        _ => {}
    }

    let container = ServiceContainer::new(load_settings(cli)?);
    execute_with(&container, cli.command.as_ref())
}

/// Dispatch against an already wired container.
pub fn execute_with(container: &ServiceContainer, command: Option<&Commands>) -> CliResult<i32> {
    match command {
        None => cmd_generate(container, &GenerateArgs::default()),
        Some(Commands::Generate(args)) => cmd_generate(container, args),
        Some(Commands::Repos) => cmd_repos(container),
        Some(Commands::Envs { repo }) => cmd_envs(container, repo),
        Some(Commands::Config {
            command: ConfigCommands::Show,
        }) => {
            output::info(&container.settings.to_toml()?);
            Ok(exitcode::OK)
        }
        Some(Commands::Config { .. }) | Some(Commands::Completion { .. }) => Err(
            CliError::Usage("command must be run through execute_command".into()),
        ),
    }
}

#[instrument(skip(container))]
fn cmd_generate(container: &ServiceContainer, args: &GenerateArgs) -> CliResult<i32> {
    let request = LeaseRequest {
        repository: args.repo.clone(),
        environment: args.env.clone(),
    };
    let lease = container.lease_service().generate(&request)?;

    if args.print {
        output::info(&lease.command);
        return Ok(exitcode::OK);
    }
    present(&lease);

    let delivery = container.delivery_service();
    let action = if args.copy {
        LeaseAction::Copy
    } else if args.run {
        LeaseAction::Run
    } else {
        delivery.choose_action()?
    };
    debug!("cmd_generate: action={:?}", action);

    match action {
        LeaseAction::Acknowledge => Ok(exitcode::OK),
        LeaseAction::Copy => {
            let tool = delivery.copy_to_clipboard(&lease.command)?;
            output::success(&format!("Copied to clipboard ({tool})"));
            Ok(exitcode::OK)
        }
        LeaseAction::Run => Ok(delivery.run_in_shell(&lease.command)?),
    }
}

fn present(lease: &GeneratedLease) {
    output::detail(&format!("{} / {}", lease.repository, lease.environment));
    output::action("Generated command", &lease.command);
}

fn cmd_repos(container: &ServiceContainer) -> CliResult<i32> {
    for repo in container.lease_service().repositories()? {
        output::info(&repo);
    }
    Ok(exitcode::OK)
}

fn cmd_envs(container: &ServiceContainer, repo: &str) -> CliResult<i32> {
    for env in container.lease_service().environments(repo)? {
        output::info(&env);
    }
    Ok(exitcode::OK)
}

fn config_target(explicit: Option<&Path>) -> CliResult<std::path::PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => global_config_path()
            .ok_or_else(|| CliError::Usage("cannot determine config directory".into())),
    }
}

fn config_path(explicit: Option<&Path>) -> CliResult<i32> {
    let path = config_target(explicit)?;
    let state = if path.exists() { "exists" } else { "missing" };
    output::info(&format!("{} ({state})", path.display()));
    Ok(exitcode::OK)
}

fn config_init(explicit: Option<&Path>, force: bool) -> CliResult<i32> {
    let path = config_target(explicit)?;
    if path.exists() && !force {
        return Err(CliError::Usage(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
    }
    std::fs::write(&path, Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    output::success(&format!("Created {}", path.display()));
    Ok(exitcode::OK)
}
