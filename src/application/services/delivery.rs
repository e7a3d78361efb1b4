//! Hand-off of a generated lease command: clipboard or shell.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::LeaseCommand;
use crate::infrastructure::traits::{CommandRunner, SelectionItem, Selector};
use crate::infrastructure::InfraError;

pub const ACTION_PROMPT: &str = "Generated command";

/// Clipboard helpers tried in order when none is configured.
const CLIPBOARD_CANDIDATES: &[&[&str]] = &[
    &["pbcopy"],
    &["wl-copy"],
    &["xclip", "-selection", "clipboard"],
];

/// What to do with a generated command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseAction {
    Acknowledge,
    Copy,
    Run,
}

impl LeaseAction {
    pub const ALL: [LeaseAction; 3] = [Self::Acknowledge, Self::Copy, Self::Run];

    pub fn label(self) -> &'static str {
        match self {
            Self::Acknowledge => "Done",
            Self::Copy => "Copy to clipboard",
            Self::Run => "Run in shell",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.label() == label)
    }
}

/// Service delivering a lease command to the clipboard or a shell.
pub struct DeliveryService {
    cmd: Arc<dyn CommandRunner>,
    selector: Arc<dyn Selector>,
    settings: Arc<Settings>,
}

impl DeliveryService {
    pub fn new(
        cmd: Arc<dyn CommandRunner>,
        selector: Arc<dyn Selector>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            cmd,
            selector,
            settings,
        }
    }

    /// Ask what to do with the command. Dismissing the picker acknowledges.
    pub fn choose_action(&self) -> ApplicationResult<LeaseAction> {
        let items: Vec<SelectionItem> = LeaseAction::ALL
            .into_iter()
            .map(|a| SelectionItem::plain(a.label()))
            .collect();
        let selected = self
            .selector
            .select_one(&items, ACTION_PROMPT)
            .map_err(|message| ApplicationError::Selection { message })?;
        Ok(selected
            .and_then(|item| LeaseAction::from_label(&item.value))
            .unwrap_or(LeaseAction::Acknowledge))
    }

    /// Pipe the command into a clipboard helper.
    ///
    /// Returns the helper program that accepted it.
    #[instrument(skip(self, command))]
    pub fn copy_to_clipboard(&self, command: &LeaseCommand) -> ApplicationResult<String> {
        let text = command.to_string();
        let candidates: Vec<Vec<String>> = match &self.settings.clipboard_command {
            Some(configured) => vec![configured.split_whitespace().map(str::to_string).collect()],
            None => CLIPBOARD_CANDIDATES
                .iter()
                .map(|c| c.iter().map(|s| s.to_string()).collect())
                .collect(),
        };

        let mut failures = Vec::new();
        for candidate in candidates {
            let Some((program, args)) = candidate.split_first() else {
                continue;
            };
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            match self.cmd.run_with_stdin(program, &args, &text) {
                Ok(output) if output.status.success() => {
                    debug!("copy_to_clipboard: via {}", program);
                    return Ok(program.clone());
                }
                Ok(output) => failures.push(format!(
                    "{program}: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                )),
                Err(e) => failures.push(format!("{program}: {e}")),
            }
        }

        let message = if failures.is_empty() {
            "no clipboard command configured".to_string()
        } else {
            failures.join("; ")
        };
        Err(ApplicationError::OperationFailed {
            context: "copy lease command".into(),
            source: Box::new(InfraError::Clipboard { message }),
        })
    }

    /// Run the command through the configured shell, attached to the terminal.
    ///
    /// Returns the command's exit code.
    #[instrument(skip(self, command))]
    pub fn run_in_shell(&self, command: &LeaseCommand) -> ApplicationResult<i32> {
        let shell = self.settings.shell.as_str();
        let text = command.to_string();
        let status = self
            .cmd
            .run_attached(shell, &["-c", &text])
            .with_command_context("run lease command", shell)?;
        debug!("run_in_shell: {} exited with {:?}", shell, status.code());
        status.code().ok_or_else(|| ApplicationError::OperationFailed {
            context: "run lease command".into(),
            source: Box::new(InfraError::Shell {
                message: format!("{shell} terminated by signal"),
                exit_code: None,
            }),
        })
    }
}
