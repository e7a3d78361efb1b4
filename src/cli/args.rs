//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

/// Generate database lease commands from .weave.yaml deployment manifests
#[derive(Parser, Debug)]
#[command(name = "weave-lease")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Config file (default: global config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// GitHub organization (overrides config and WEAVE_LEASE_ORG)
    #[arg(short, long, global = true)]
    pub org: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pick repo and environment, print the lease command (default)
    Generate(GenerateArgs),

    /// List organization repositories
    Repos,

    /// List environments in a repository's manifest
    Envs {
        /// Repository name
        repo: String,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerateArgs {
    /// Repository (skips the repository picker)
    #[arg(short, long)]
    pub repo: Option<String>,

    /// Environment (skips the environment picker)
    #[arg(short, long)]
    pub env: Option<String>,

    /// Copy the command to the clipboard
    #[arg(long, conflicts_with_all = ["run", "print"])]
    pub copy: bool,

    /// Run the command in a shell
    #[arg(long, conflicts_with_all = ["copy", "print"])]
    pub run: bool,

    /// Print only the bare command
    #[arg(long, conflicts_with_all = ["copy", "run"])]
    pub print: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
