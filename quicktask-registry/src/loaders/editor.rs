//! Editor task-definition scanner (`.vscode/tasks.json`)
//!
//! These tasks are not shell commands; the command line is the editor's task
//! identifier and execution is delegated to the host's native task runner.

use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

use crate::discover::FilePattern;
use crate::error::Result;
use crate::loaders::{TaskLoader, WatchSpec};
use crate::types::{Task, TaskKind, Workspace};

use quicktask_config::QuickTaskConfig;

pub struct EditorTaskLoader {
    enabled: bool,
    task_file: String,
}

impl EditorTaskLoader {
    pub fn from_config(config: &QuickTaskConfig) -> Self {
        Self {
            enabled: config.sources.editor.enabled,
            task_file: config.sources.editor.task_file.clone(),
        }
    }

    async fn parse_file(&self, path: &Path, workspace: &Workspace) -> Vec<Task> {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) => {
                debug!("Task file not readable {:?}: {}", path, e);
                return Vec::new();
            }
        };

        let definition: serde_json_lenient::Value = match serde_json_lenient::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                debug!("Invalid task file {:?}: {}", path, e);
                return Vec::new();
            }
        };

        let scope = workspace
            .root_of(path)
            .map(|r| r.name.clone())
            .unwrap_or_default();
        let description = workspace.relative_path(path);

        let mut tasks = Vec::new();

        if let Some(entries) = definition.get("tasks").and_then(|v| v.as_array()) {
            for entry in entries {
                // `label` with a legacy `taskName` fallback
                let identifier = entry
                    .get("label")
                    .or_else(|| entry.get("taskName"))
                    .and_then(|v| v.as_str());

                if let Some(identifier) = identifier {
                    tasks.push(Task::new(
                        TaskKind::EditorTask,
                        identifier,
                        identifier,
                        Some(path.to_path_buf()),
                        &scope,
                        &description,
                    ));
                }
            }
        } else if let Some(command) = definition.get("command").and_then(|v| v.as_str()) {
            tasks.push(Task::new(
                TaskKind::EditorTask,
                command,
                command,
                Some(path.to_path_buf()),
                &scope,
                &description,
            ));
        }

        tasks
    }
}

#[async_trait]
impl TaskLoader for EditorTaskLoader {
    fn kind(&self) -> TaskKind {
        TaskKind::EditorTask
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn watch_spec(&self) -> Option<WatchSpec> {
        // Direct path per root, but watch events still route by pattern
        let pattern = FilePattern::new(&self.task_file, "", false).ok()?;
        Some(WatchSpec {
            pattern,
            ignore_change_events: false,
        })
    }

    async fn scan(&self, workspace: &Workspace) -> Result<Vec<Task>> {
        // One well-known file per workspace root; no glob walk needed
        let mut tasks = Vec::new();

        for root in workspace.roots() {
            let path = root.path.join(&self.task_file);
            if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                debug!("No task file at {:?}", path);
                continue;
            }
            tasks.extend(self.parse_file(&path, workspace).await);
        }

        Ok(tasks)
    }
}
