//! Scan progress presentation and the task picker
//!
//! The presenter owns the receiving side of the loaders' completion channel
//! and tracks the scan state: scanning until every loader reports done, then
//! ready (with or without tasks). The picker is only offered once ready.

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, FuzzySelect};
use std::sync::Arc;
use tracing::{debug, warn};

use quicktask_registry::{ScanEvents, ScanOutcome, Task, TaskRegistry};

/// Presenter state, advanced by loader completion events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Scanning,
    Ready { empty: bool },
}

/// What the user chose from the picker
#[derive(Debug)]
pub enum Selection {
    Task(Task),
    Rescan,
    Quit,
}

pub struct Presenter {
    registry: Arc<TaskRegistry>,
    events: ScanEvents,
    state: ScanState,
}

impl Presenter {
    pub fn new(registry: Arc<TaskRegistry>, events: ScanEvents) -> Self {
        Self {
            registry,
            events,
            state: ScanState::Scanning,
        }
    }

    /// Current presenter state. Scanning until every loader reports done;
    /// a rescan request returns here to Scanning.
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Consume completion events until every loader is done, then report
    /// the resulting state
    pub async fn wait_until_ready(&mut self) -> Result<ScanState> {
        if !self.registry.all_finished() {
            self.state = ScanState::Scanning;
            println!("{}", "Scanning workspace for tasks...".dimmed());
        }

        while !self.registry.all_finished() {
            let event = self
                .events
                .recv()
                .await
                .context("scan event channel closed")?;

            match event.outcome {
                ScanOutcome::Completed(count) => {
                    debug!("{}: {} task(s)", event.kind.source_name(), count);
                }
                ScanOutcome::Skipped => {
                    debug!("{}: disabled", event.kind.source_name());
                }
                ScanOutcome::Failed(reason) => {
                    warn!("{}: scan failed: {}", event.kind.source_name(), reason);
                }
            }
        }

        let tasks = self.registry.merged_tasks().await;
        if tasks.is_empty() {
            println!("{}", "No tasks found.".yellow());
            self.state = ScanState::Ready { empty: true };
        } else {
            println!("{}", format!("{} task(s) available.", tasks.len()).green());
            self.state = ScanState::Ready { empty: false };
        }

        Ok(self.state)
    }

    /// Offer the picker (or, with no tasks, a rescan prompt)
    pub async fn pick(&mut self) -> Result<Selection> {
        if self.registry.is_empty().await {
            return self.offer_rescan().await;
        }

        let items = self.registry.selection_items().await;
        let rows: Vec<String> = items
            .iter()
            .map(|item| {
                if item.description.is_empty() {
                    item.label.clone()
                } else {
                    format!("{}  {}", item.label, item.description.dimmed())
                }
            })
            .collect();

        // dialoguer blocks on the terminal
        let chosen = tokio::task::spawn_blocking(move || {
            FuzzySelect::with_theme(&ColorfulTheme::default())
                .with_prompt("Select a task to run")
                .items(&rows)
                .default(0)
                .interact_opt()
        })
        .await
        .context("picker task panicked")?
        .context("picker failed")?;

        let Some(index) = chosen else {
            return Ok(Selection::Quit);
        };

        let item = &items[index];
        let task = self
            .registry
            .find_task(&item.label, &item.description)
            .await
            .context("selected task disappeared from the registry")?;

        Ok(Selection::Task(task))
    }

    async fn offer_rescan(&mut self) -> Result<Selection> {
        let rescan = tokio::task::spawn_blocking(|| {
            Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt("No tasks found in the workspace. Rescan?")
                .default(true)
                .interact()
        })
        .await
        .context("prompt task panicked")?
        .context("prompt failed")?;

        if rescan {
            self.registry.reload_all();
            self.state = ScanState::Scanning;
            Ok(Selection::Rescan)
        } else {
            Ok(Selection::Quit)
        }
    }
}
