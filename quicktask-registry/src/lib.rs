//! Task discovery and aggregation for QuickTask
//!
//! Five loaders scan the workspace concurrently, each for one category of
//! task source. Every loader reports completion over a shared event channel;
//! the registry merges their results into one deduplicated, sorted view on
//! demand and knows when all scanning is done.

pub mod discover;
pub mod error;
pub mod loader;
pub mod loaders;
pub mod registry;
pub mod types;
pub mod watcher;

// Re-export main types and traits
pub use error::{RegistryError, Result};
pub use loader::{Loader, ScanEvents};
pub use loaders::{create_loaders, TaskLoader, WatchSpec};
pub use registry::TaskRegistry;
pub use types::{ScanEvent, ScanOutcome, SelectionItem, Task, TaskKind, Workspace, WorkspaceRoot};
pub use watcher::WorkspaceWatcher;
