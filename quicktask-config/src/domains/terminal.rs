//! Terminal and execution preferences

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Terminal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Whether the spawned terminal's output is shown
    #[serde(default = "crate::domains::utils::default_true")]
    pub show_terminal: bool,

    /// Send an exit instruction after the command so the terminal closes
    #[serde(default = "crate::domains::utils::default_false")]
    pub close_after_run: bool,

    /// Shell binary used for terminal sessions; platform default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,

    /// Command used to delegate editor-native tasks to the host editor's
    /// task runner (the task identifier is appended). When unset, native
    /// tasks cannot be executed from the CLI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_task_command: Option<String>,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            show_terminal: true,
            close_after_run: false,
            shell: None,
            native_task_command: None,
        }
    }
}

impl Validatable for TerminalConfig {
    fn validate(&self) -> ConfigResult<()> {
        if let Some(shell) = &self.shell {
            if shell.is_empty() {
                return Err(self.validation_error("shell cannot be an empty string"));
            }
        }
        if let Some(command) = &self.native_task_command {
            if command.is_empty() {
                return Err(self.validation_error("native_task_command cannot be an empty string"));
            }
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "terminal"
    }
}
