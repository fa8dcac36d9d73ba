//! Persistence for the most recently run task

use anyhow::{Context, Result};
use std::path::PathBuf;

use quicktask_registry::Task;

pub struct History {
    path: PathBuf,
}

impl History {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// History in the platform state directory
    pub fn default_location() -> Result<Self> {
        let base = dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .context("no writable state directory on this platform")?;
        Ok(Self::new(base.join("quicktask").join("last-task.json")))
    }

    pub fn remember(&self, task: &Task) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(task)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write {:?}", self.path))?;
        Ok(())
    }

    /// The last remembered task, if any. A corrupt history file is treated
    /// as empty rather than an error.
    pub fn recall(&self) -> Result<Option<Task>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {:?}", self.path));
            }
        };

        Ok(serde_json::from_str(&text).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quicktask_registry::TaskKind;

    fn history_in_tempdir() -> (tempfile::TempDir, History) {
        let dir = tempfile::tempdir().unwrap();
        let history = History::new(dir.path().join("state/last-task.json"));
        (dir, history)
    }

    #[test]
    fn test_remember_and_recall() {
        let (_dir, history) = history_in_tempdir();
        let task = Task::new(TaskKind::UserDefined, "make all", "make all", None, "ws", "d");

        history.remember(&task).unwrap();
        let recalled = history.recall().unwrap().unwrap();
        assert_eq!(recalled, task);
    }

    #[test]
    fn test_recall_without_history() {
        let (_dir, history) = history_in_tempdir();
        assert!(history.recall().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_history_is_empty() {
        let (_dir, history) = history_in_tempdir();
        std::fs::create_dir_all(history.path.parent().unwrap()).unwrap();
        std::fs::write(&history.path, "not json").unwrap();
        assert!(history.recall().unwrap().is_none());
    }
}
