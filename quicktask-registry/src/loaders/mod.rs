pub mod build_tool;
pub mod editor;
pub mod package;
pub mod script;
pub mod user;

use async_trait::async_trait;
use std::sync::Arc;

use crate::discover::FilePattern;
use crate::error::Result;
use crate::types::{Task, TaskKind, Workspace};

use quicktask_config::QuickTaskConfig;

/// What a loader wants watched: files matching its discovery pattern, with
/// modify events optionally suppressed for high-churn sources.
#[derive(Debug, Clone)]
pub struct WatchSpec {
    pub pattern: FilePattern,
    pub ignore_change_events: bool,
}

/// One category of task source. Implementations only discover and parse;
/// state tracking, completion reporting and reload scheduling live in
/// [`crate::loader::Loader`].
#[async_trait]
pub trait TaskLoader: Send + Sync {
    fn kind(&self) -> TaskKind;

    /// Disabled loaders complete immediately with an empty list and no I/O
    fn enabled(&self) -> bool;

    /// Files whose create/modify/delete should trigger a reload
    fn watch_spec(&self) -> Option<WatchSpec> {
        None
    }

    /// Discover and parse, producing a fresh task list. Per-file parse
    /// failures must be swallowed (contributing zero tasks); only a failure
    /// of the batch itself is an error.
    async fn scan(&self, workspace: &Workspace) -> Result<Vec<Task>>;
}

/// Construct the full loader set from configuration
pub fn create_loaders(config: &QuickTaskConfig) -> Result<Vec<Arc<dyn TaskLoader>>> {
    Ok(vec![
        Arc::new(build_tool::BuildToolLoader::from_config(config)?),
        Arc::new(package::PackageScriptLoader::from_config(config)?),
        Arc::new(editor::EditorTaskLoader::from_config(config)),
        Arc::new(script::ScriptLoader::from_config(config)?),
        Arc::new(user::UserDefinedLoader::from_config(config)),
    ])
}
