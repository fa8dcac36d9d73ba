//! Static user-defined task list, emitted verbatim from configuration

use async_trait::async_trait;

use crate::error::Result;
use crate::loaders::TaskLoader;
use crate::types::{Task, TaskKind, Workspace};

use quicktask_config::QuickTaskConfig;

pub struct UserDefinedLoader {
    commands: Vec<String>,
}

impl UserDefinedLoader {
    pub fn from_config(config: &QuickTaskConfig) -> Self {
        Self {
            commands: config.sources.user_tasks.clone(),
        }
    }
}

#[async_trait]
impl TaskLoader for UserDefinedLoader {
    fn kind(&self) -> TaskKind {
        TaskKind::UserDefined
    }

    fn enabled(&self) -> bool {
        true
    }

    // No watch_spec: nothing on disk to watch. The presenter reloads this
    // loader when the configuration changes.

    async fn scan(&self, workspace: &Workspace) -> Result<Vec<Task>> {
        let scope = workspace
            .roots()
            .first()
            .map(|r| r.name.clone())
            .unwrap_or_default();

        Ok(self
            .commands
            .iter()
            .map(|command| {
                Task::new(
                    TaskKind::UserDefined,
                    command,
                    command,
                    None,
                    &scope,
                    "User Defined Tasks",
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_commands_emitted_verbatim() {
        let mut config = QuickTaskConfig::default();
        config.sources.user_tasks = vec!["make all".to_string(), "cargo fmt".to_string()];

        let loader = UserDefinedLoader::from_config(&config);
        let tasks = loader.scan(&Workspace::single("/tmp/demo")).await.unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].command_line, "make all");
        assert_eq!(tasks[0].description, "User Defined Tasks");
        assert!(tasks[0].source_path.is_none());
        assert_eq!(tasks[0].scope, "demo");
    }

    #[tokio::test]
    async fn test_empty_list_is_fine() {
        let loader = UserDefinedLoader::from_config(&QuickTaskConfig::default());
        let tasks = loader.scan(&Workspace::default()).await.unwrap();
        assert!(tasks.is_empty());
    }
}
