//! The aggregated task view
//!
//! Merging is pull-based: every query recomputes from the loaders' current
//! lists, so it is safe to call mid-scan and reflects partial state.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::loader::{Loader, ScanEvents};
use crate::loaders::create_loaders;
use crate::types::{SelectionItem, Task, TaskKind, Workspace};

use quicktask_config::QuickTaskConfig;

pub struct TaskRegistry {
    loaders: Vec<Loader>,
    workspace: Arc<Workspace>,
}

impl TaskRegistry {
    /// Build the registry with the full loader set and the shared completion
    /// channel its loaders report on.
    pub fn from_config(
        config: &QuickTaskConfig,
        workspace: Workspace,
    ) -> Result<(Self, ScanEvents)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let workspace = Arc::new(workspace);

        let loaders = create_loaders(config)?
            .into_iter()
            .map(|inner| Loader::new(inner, workspace.clone(), tx.clone()))
            .collect();

        Ok((Self { loaders, workspace }, rx))
    }

    /// Assemble a registry from pre-built loaders (tests, custom setups)
    pub fn new(loaders: Vec<Loader>, workspace: Arc<Workspace>) -> Self {
        Self { loaders, workspace }
    }

    pub fn loaders(&self) -> &[Loader] {
        &self.loaders
    }

    pub fn loader(&self, kind: TaskKind) -> Option<&Loader> {
        self.loaders.iter().find(|l| l.kind() == kind)
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Start an initial scan on every loader, concurrently
    pub fn load_all(&self) {
        for loader in &self.loaders {
            loader.spawn_load();
        }
    }

    /// Schedule a debounced reload on every loader
    pub fn reload_all(&self) {
        for loader in &self.loaders {
            loader.reload();
        }
    }

    /// True once every loader is disabled or has completed its last
    /// requested scan; a pending reload reads as unfinished. Idempotent and
    /// side-effect-free, so overlapping completion events may each call it.
    pub fn all_finished(&self) -> bool {
        self.loaders.iter().all(Loader::is_finished)
    }

    /// Merge, deduplicate and sort all loaders' current tasks
    pub async fn merged_tasks(&self) -> Vec<Task> {
        let mut seen = HashSet::new();
        let mut merged = Vec::new();

        for loader in &self.loaders {
            for task in loader.tasks().await {
                if seen.insert(task.clone()) {
                    merged.push(task);
                }
            }
        }

        merged.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        merged
    }

    pub async fn is_empty(&self) -> bool {
        self.merged_tasks().await.is_empty()
    }

    /// The (label, description) projection shown in the picker, in display
    /// order
    pub async fn selection_items(&self) -> Vec<SelectionItem> {
        self.merged_tasks()
            .await
            .into_iter()
            .map(|task| SelectionItem {
                label: task.label,
                description: task.description,
            })
            .collect()
    }

    /// Resolve a picker selection back to the full task. The (label,
    /// description) pair is the only key the picker round-trips; the first
    /// match wins (duplicates cannot survive the dedup step).
    pub async fn find_task(&self, label: &str, description: &str) -> Option<Task> {
        self.merged_tasks()
            .await
            .into_iter()
            .find(|task| task.label == label && task.description == description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::user::UserDefinedLoader;
    use std::time::Duration;

    fn registry_with_user_tasks(lists: &[&[&str]]) -> (TaskRegistry, ScanEvents) {
        let (tx, rx) = mpsc::unbounded_channel();
        let workspace = Arc::new(Workspace::single("/tmp/demo"));

        let loaders = lists
            .iter()
            .map(|commands| {
                let mut config = QuickTaskConfig::default();
                config.sources.user_tasks = commands.iter().map(|c| c.to_string()).collect();
                Loader::new(
                    Arc::new(UserDefinedLoader::from_config(&config)),
                    workspace.clone(),
                    tx.clone(),
                )
            })
            .collect();

        (TaskRegistry::new(loaders, workspace), rx)
    }

    #[tokio::test]
    async fn test_dedup_across_loaders() {
        let (registry, _rx) = registry_with_user_tasks(&[&["make all"], &["make all"]]);

        for loader in registry.loaders() {
            loader.load().await;
        }

        assert_eq!(registry.merged_tasks().await.len(), 1);
    }

    #[tokio::test]
    async fn test_sort_stability() {
        let (registry, _rx) = registry_with_user_tasks(&[&["b task", "a task", "c task"]]);
        registry.loaders()[0].load().await;

        let first = registry.selection_items().await;
        let second = registry.selection_items().await;
        assert_eq!(first, second);

        let labels: Vec<_> = first.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["[user] a task", "[user] b task", "[user] c task"]);
    }

    #[tokio::test]
    async fn test_find_task_round_trips_every_item() {
        let (registry, _rx) = registry_with_user_tasks(&[&["one", "two", "three"]]);
        registry.loaders()[0].load().await;

        for item in registry.selection_items().await {
            let task = registry.find_task(&item.label, &item.description).await;
            assert!(task.is_some(), "no task for {:?}", item.label);
        }
    }

    #[tokio::test]
    async fn test_is_empty_safe_mid_scan() {
        let (registry, _rx) = registry_with_user_tasks(&[&["one"]]);

        // Nothing loaded yet: empty, and not finished
        assert!(registry.is_empty().await);
        assert!(!registry.all_finished());

        registry.loaders()[0].load().await;
        assert!(!registry.is_empty().await);
        assert!(registry.all_finished());
    }

    #[tokio::test]
    async fn test_reload_drops_readiness_immediately() {
        let (registry, mut rx) = registry_with_user_tasks(&[&["one"]]);
        registry.loaders()[0].load().await;
        assert!(registry.all_finished());

        // The rescan request itself must flip readiness, not the scan it
        // eventually schedules
        registry.reload_all();
        assert!(!registry.all_finished());

        // Readiness returns once the queued scan completes
        let _ = rx.recv().await;
        let _ = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("reload scan never completed");
        assert!(registry.all_finished());
    }
}
