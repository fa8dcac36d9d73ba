//! Package manifest scanner: one task per `scripts` entry

use async_trait::async_trait;
use futures::future::join_all;
use std::path::Path;
use tracing::debug;

use crate::discover::FilePattern;
use crate::error::Result;
use crate::loaders::{TaskLoader, WatchSpec};
use crate::types::{Task, TaskKind, Workspace};

use quicktask_config::QuickTaskConfig;

pub struct PackageScriptLoader {
    enabled: bool,
    pattern: FilePattern,
    run_prefix: &'static str,
}

impl PackageScriptLoader {
    pub fn from_config(config: &QuickTaskConfig) -> Result<Self> {
        let sources = &config.sources;
        Ok(Self {
            enabled: sources.package.enabled,
            pattern: FilePattern::new(
                &sources.package.glob,
                &sources.exclude_glob,
                sources.search_subdirectories,
            )?,
            run_prefix: sources.package.manager.run_prefix(),
        })
    }

    async fn parse_file(&self, path: &Path, workspace: &Workspace) -> Vec<Task> {
        match self.try_parse(path, workspace).await {
            Ok(tasks) => tasks,
            Err(e) => {
                debug!("Skipping unparsable manifest {:?}: {}", path, e);
                Vec::new()
            }
        }
    }

    async fn try_parse(&self, path: &Path, workspace: &Workspace) -> Result<Vec<Task>> {
        let text = tokio::fs::read_to_string(path).await?;
        let manifest: serde_json_lenient::Value = serde_json_lenient::from_str(&text)?;

        let scope = workspace
            .root_of(path)
            .map(|r| r.name.clone())
            .unwrap_or_default();
        let description = workspace.relative_path(path);

        let mut tasks = Vec::new();
        if let Some(scripts) = manifest.get("scripts").and_then(|v| v.as_object()) {
            for name in scripts.keys() {
                let command = format!("{} {}", self.run_prefix, name);
                tasks.push(Task::new(
                    TaskKind::PackageScript,
                    &command,
                    &command,
                    Some(path.to_path_buf()),
                    &scope,
                    &description,
                ));
            }
        }

        Ok(tasks)
    }
}

#[async_trait]
impl TaskLoader for PackageScriptLoader {
    fn kind(&self) -> TaskKind {
        TaskKind::PackageScript
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

        // Unordered fan-out; every file contributes disjoint entries
        let parsed = join_all(files.iter().map(|f| self.parse_file(f, workspace))).await;

        Ok(parsed.into_iter().flatten().collect())
    }
}
