//! Standalone script scanner: one task per recognized script file
//!
//! File contents are never parsed; the extension alone selects an
//! interpreter-table entry. Modify events are ignored by the watcher since
//! script edits do not change the task list.

use async_trait::async_trait;
use std::path::Path;

use crate::discover::FilePattern;
use crate::error::Result;
use crate::loaders::{TaskLoader, WatchSpec};
use crate::types::{Task, TaskKind, Workspace};

use quicktask_config::{QuickTaskConfig, ScriptsConfig};

pub struct ScriptLoader {
    enabled: bool,
    pattern: FilePattern,
    interpreters: ScriptsConfig,
}

impl ScriptLoader {
    pub fn from_config(config: &QuickTaskConfig) -> Result<Self> {
        let sources = &config.sources;
        Ok(Self {
            enabled: sources.script.enabled,
            pattern: FilePattern::new(
                &sources.script.glob,
                &sources.exclude_glob,
                sources.search_subdirectories,
            )?,
            interpreters: config.scripts.clone(),
        })
    }

    fn task_for_file(&self, path: &Path, workspace: &Workspace) -> Option<Task> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        let interpreter = self.interpreters.for_extension(&extension)?;

        if !interpreter.enabled {
            return None;
        }

        let file = quote_if_spaced(&path.to_string_lossy());
        let command = if interpreter.command.is_empty() {
            file
        } else {
            format!("{} {}", interpreter.command, file)
        };

        let scope = workspace
            .root_of(path)
            .map(|r| r.name.clone())
            .unwrap_or_default();
        let description = workspace.relative_path(path);

        Some(Task::new(
            TaskKind::Script,
            &command,
            &command,
            Some(path.to_path_buf()),
            scope,
            description,
        ))
    }
}

/// Quote a path for the shell when it contains whitespace
fn quote_if_spaced(path: &str) -> String {
    if path.contains(' ') {
        format!("\"{}\"", path)
    } else {
        path.to_string()
    }
}

#[async_trait]
impl TaskLoader for ScriptLoader {
    fn kind(&self) -> TaskKind {
        TaskKind::Script
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn watch_spec(&self) -> Option<WatchSpec> {
        Some(WatchSpec {
            pattern: self.pattern.clone(),
            ignore_change_events: true,
        })
    }

    async fn scan(&self, workspace: &Workspace) -> Result<Vec<Task>> {
        let files = self.pattern.find_files(workspace).await?;

        Ok(files
            .iter()
            .filter_map(|f| self.task_for_file(f, workspace))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader(configure: impl FnOnce(&mut QuickTaskConfig)) -> ScriptLoader {
        let mut config = QuickTaskConfig::default();
        configure(&mut config);
        ScriptLoader::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn test_shell_script_direct_execution() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("deploy.sh"), "#!/bin/sh\n").unwrap();

        let tasks = loader(|_| {})
            .scan(&Workspace::single(dir.path()))
            .await
            .unwrap();

        assert_eq!(tasks.len(), 1);
        // Empty interpreter prefix: the command is the absolute path itself
        assert_eq!(
            tasks[0].command_line,
            dir.path().join("deploy.sh").to_string_lossy()
        );
    }

    #[tokio::test]
    async fn test_disabled_type_contributes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("deploy.sh"), "#!/bin/sh\n").unwrap();

        let disabled = loader(|c| c.scripts.shell.enabled = false);
        let tasks = disabled
            .scan(&Workspace::single(dir.path()))
            .await
            .unwrap();
        assert!(tasks.is_empty());

        // Flipping the flag back on rediscovers the file
        let enabled = loader(|_| {});
        let tasks = enabled.scan(&Workspace::single(dir.path())).await.unwrap();
        assert_eq!(tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_interpreter_prefix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tool.py"), "print('hi')\n").unwrap();

        let tasks = loader(|_| {})
            .scan(&Workspace::single(dir.path()))
            .await
            .unwrap();
        assert_eq!(
            tasks[0].command_line,
            format!("python {}", dir.path().join("tool.py").display())
        );
    }

    #[tokio::test]
    async fn test_spaced_path_is_quoted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("my scripts")).unwrap();
        std::fs::write(dir.path().join("my scripts/run.sh"), "").unwrap();

        let deep = loader(|c| c.sources.search_subdirectories = true);
        let tasks = deep.scan(&Workspace::single(dir.path())).await.unwrap();

        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].command_line.starts_with('"'));
        assert!(tasks[0].command_line.ends_with('"'));
    }

    #[tokio::test]
    async fn test_unknown_extension_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("data.csv"), "a,b\n").unwrap();

        let tasks = loader(|_| {})
            .scan(&Workspace::single(dir.path()))
            .await
            .unwrap();
        assert!(tasks.is_empty());
    }
}
