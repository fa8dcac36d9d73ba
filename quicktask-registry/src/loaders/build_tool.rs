//! Build-tool config scanner (gulp)
//!
//! The authoritative task list comes from the build tool itself
//! (`gulp --tasks-simple`, one task name per stdout line). When that
//! invocation fails for any reason the loader falls back to a textual scan
//! of the config file for task-registration calls.

use async_trait::async_trait;
use futures::future::join_all;
use regex::Regex;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::discover::FilePattern;
use crate::error::Result;
use crate::loaders::{TaskLoader, WatchSpec};
use crate::types::{Task, TaskKind, Workspace};

use quicktask_config::QuickTaskConfig;

/// Gulpfile spellings from most to least specific. When several coexist in
/// one directory only the most specific is processed, so the same task set
/// is never emitted twice.
const PRIMACY: &[&str] = &["gulpfile.ts", "gulpfile.babel.js", "gulpfile.js"];

pub struct BuildToolLoader {
    enabled: bool,
    pattern: FilePattern,
    list_timeout: Duration,
    task_call: Regex,
}

impl BuildToolLoader {
    pub fn from_config(config: &QuickTaskConfig) -> Result<Self> {
        let sources = &config.sources;
        Ok(Self {
            enabled: sources.build_tool.enabled,
            pattern: FilePattern::new(
                &sources.build_tool.glob,
                &sources.exclude_glob,
                sources.search_subdirectories,
            )?,
            list_timeout: Duration::from_secs(sources.build_tool.list_timeout_secs),
            task_call: Regex::new(r#"gulp\.task\(\s*['"]([^'"]+)['"]"#)
                .map_err(|e| crate::error::RegistryError::Configuration(e.to_string()))?,
        })
    }

    /// True when a more specific gulpfile spelling sits next to this one
    async fn superseded(path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let Some(rank) = PRIMACY.iter().position(|p| *p == name) else {
            return false;
        };
        let Some(dir) = path.parent() else {
            return false;
        };

        for primary in &PRIMACY[..rank] {
            if tokio::fs::try_exists(dir.join(primary)).await.unwrap_or(false) {
                return true;
            }
        }

        false
    }

    async fn tasks_for_file(&self, path: &Path, workspace: &Workspace) -> Vec<Task> {
        if Self::superseded(path).await {
            debug!("Skipping {:?}: a more specific gulpfile exists", path);
            return Vec::new();
        }

        let names = match self.list_via_tool(path).await {
            Ok(names) => names,
            Err(e) => {
                debug!("gulp --tasks-simple failed for {:?} ({}), falling back to textual scan", path, e);
                match self.list_via_regex(path).await {
                    Ok(names) => names,
                    Err(e) => {
                        debug!("Textual scan of {:?} failed: {}", path, e);
                        return Vec::new();
                    }
                }
            }
        };

        let scope = workspace
            .root_of(path)
            .map(|r| r.name.clone())
            .unwrap_or_default();
        let description = workspace.relative_path(path);

        names
            .into_iter()
            .map(|name| {
                let command = format!("gulp {}", name);
                Task::new(
                    TaskKind::BuildTool,
                    &command,
                    &command,
                    Some(path.to_path_buf()),
                    &scope,
                    &description,
                )
            })
            .collect()
    }

    /// Ask the build tool for its task list, bounded by a timeout
    async fn list_via_tool(&self, path: &Path) -> Result<Vec<String>> {
        let dir = path
            .parent()
            .ok_or_else(|| crate::error::RegistryError::Scan("gulpfile has no parent".into()))?;

        let output = tokio::time::timeout(
            self.list_timeout,
            Command::new("gulp")
                .arg("--tasks-simple")
                .current_dir(dir)
                .output(),
        )
        .await
        .map_err(|_| crate::error::RegistryError::Scan("gulp --tasks-simple timed out".into()))??;

        if !output.status.success() {
            return Err(crate::error::RegistryError::Scan(format!(
                "gulp exited with {}",
                output.status
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    /// Fallback: extract quoted names from task-registration calls
    async fn list_via_regex(&self, path: &Path) -> Result<Vec<String>> {
        let text = tokio::fs::read_to_string(path).await?;

        Ok(self
            .task_call
            .captures_iter(&text)
            .map(|captures| captures[1].to_string())
            .collect())
    }
}

#[async_trait]
impl TaskLoader for BuildToolLoader {
    fn kind(&self) -> TaskKind {
        TaskKind::BuildTool
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn watch_spec(&self) -> Option<WatchSpec> {
        Some(WatchSpec {
            pattern: self.pattern.clone(),
            ignore_change_events: false,
        })
    }

    async fn scan(&self, workspace: &Workspace) -> Result<Vec<Task>> {
        let files = self.pattern.find_files(workspace).await?;

        let parsed = join_all(files.iter().map(|f| self.tasks_for_file(f, workspace))).await;

        Ok(parsed.into_iter().flatten().collect())
    }
}
