//! Task execution through a spawned shell session
//!
//! A selected task runs inside a fresh shell whose stdin is scripted: change
//! to the task's directory (switching drives first on Windows), run the
//! command line, optionally exit. Editor-native tasks are not shell commands
//! and are delegated to a configured external runner instead.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use quicktask_config::TerminalConfig;
use quicktask_registry::Task;

pub struct TaskRunner {
    terminal: TerminalConfig,
}

impl TaskRunner {
    pub fn new(terminal: TerminalConfig) -> Self {
        Self { terminal }
    }

    pub async fn run(&self, task: &Task) -> Result<()> {
        if task.editor_native {
            return self.run_native(task).await;
        }

        println!("{} {}", "Running".green().bold(), task.label);

        let shell = self.shell_binary();
        debug!("Spawning shell session: {}", shell);

        let mut command = Command::new(&shell);
        command.stdin(Stdio::piped());
        if !self.terminal.show_terminal {
            command.stdout(Stdio::null());
            command.stderr(Stdio::null());
        }

        let mut child = command
            .spawn()
            .with_context(|| format!("failed to spawn shell '{}'", shell))?;

        let script = self.session_script(task);
        let mut stdin = child.stdin.take().context("shell stdin unavailable")?;
        stdin.write_all(script.as_bytes()).await?;
        // Closing stdin ends the session once the command finishes
        drop(stdin);

        let status = child.wait().await.context("shell session failed")?;
        info!("Task '{}' finished: {}", task.label, status);

        if status.success() {
            println!("{} {}", "Finished".green(), task.label);
        } else {
            println!("{} {} ({})", "Failed".red().bold(), task.label, status);
        }

        Ok(())
    }

    /// Delegate an editor task to the host editor's task runner
    async fn run_native(&self, task: &Task) -> Result<()> {
        let Some(runner) = &self.terminal.native_task_command else {
            println!(
                "{} '{}' is an editor task; set terminal.native_task_command to run it from here",
                "Note:".yellow().bold(),
                task.label
            );
            return Ok(());
        };

        println!("{} {}", "Delegating".green().bold(), task.label);

        let status = Command::new(self.shell_binary())
            .arg(shell_eval_flag())
            .arg(format!("{} {}", runner, task.command_line))
            .status()
            .await
            .with_context(|| format!("failed to run '{}'", runner))?;

        if !status.success() {
            println!("{} {} ({})", "Failed".red().bold(), task.label, status);
        }

        Ok(())
    }

    fn shell_binary(&self) -> String {
        if let Some(shell) = &self.terminal.shell {
            return shell.clone();
        }
        if cfg!(windows) {
            "cmd.exe".to_string()
        } else {
            std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
        }
    }

    /// The lines fed to the shell session for one task
    fn session_script(&self, task: &Task) -> String {
        let mut lines = Vec::new();

        if let Some(dir) = task.working_dir() {
            if let Some(drive) = drive_switch(dir) {
                lines.push(drive);
            }
            lines.push(format!("cd \"{}\"", dir.display()));
        }

        lines.push(task.command_line.clone());

        if self.terminal.close_after_run {
            lines.push("exit".to_string());
        }

        lines.join("\n") + "\n"
    }
}

/// On Windows, `cd` alone does not change drives; the session needs a bare
/// `X:` line first.
#[cfg(windows)]
fn drive_switch(dir: &Path) -> Option<String> {
    let text = dir.to_str()?;
    let mut chars = text.chars();
    let letter = chars.next()?;
    if letter.is_ascii_alphabetic() && chars.next() == Some(':') {
        Some(format!("{}:", letter))
    } else {
        None
    }
}

#[cfg(not(windows))]
fn drive_switch(_dir: &Path) -> Option<String> {
    None
}

#[cfg(windows)]
fn shell_eval_flag() -> &'static str {
    "/c"
}

#[cfg(not(windows))]
fn shell_eval_flag() -> &'static str {
    "-c"
}
