use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// Category of a discovered task, determining its display prefix and how a
/// selected task is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    BuildTool,
    PackageScript,
    EditorTask,
    Script,
    UserDefined,
}

impl TaskKind {
    /// Tag prepended to the display label
    pub fn prefix(&self) -> &'static str {
        match self {
            TaskKind::BuildTool => "[gulp]",
            TaskKind::PackageScript => "[npm]",
            TaskKind::EditorTask => "[editor]",
            TaskKind::Script => "[script]",
            TaskKind::UserDefined => "[user]",
        }
    }

    /// Human-readable source name, used in notifications
    pub fn source_name(&self) -> &'static str {
        match self {
            TaskKind::BuildTool => "build tool tasks",
            TaskKind::PackageScript => "package scripts",
            TaskKind::EditorTask => "editor tasks",
            TaskKind::Script => "scripts",
            TaskKind::UserDefined => "user defined tasks",
        }
    }
}

/// A discovered, runnable unit of work.
///
/// Tasks are immutable once constructed; loaders build a fresh list on every
/// scan. Equality (and therefore dedup in the aggregated view) is structural
/// over (kind, label, command_line, description) — `source_path` and `scope`
/// are deliberately excluded so the same logical task discovered through
/// overlapping globs collapses to one entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub kind: TaskKind,
    /// Display label, already carrying the kind prefix
    pub label: String,
    /// Exact shell command, or the editor task identifier
    pub command_line: String,
    /// File the task was discovered in; None for user-defined tasks
    pub source_path: Option<PathBuf>,
    /// Enclosing workspace-folder name
    pub scope: String,
    /// Secondary picker text (relative path or scope name)
    pub description: String,
    /// True only for editor task-file tasks; execution is delegated to the
    /// host's native task runner instead of a spawned terminal
    pub editor_native: bool,
}

impl Task {
    pub fn new(
        kind: TaskKind,
        label: impl Into<String>,
        command_line: impl Into<String>,
        source_path: Option<PathBuf>,
        scope: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            label: format!("{} {}", kind.prefix(), label.into()),
            command_line: command_line.into(),
            source_path,
            scope: scope.into(),
            description: description.into(),
            editor_native: kind == TaskKind::EditorTask,
        }
    }

    /// Directory the task should execute in, when known
    pub fn working_dir(&self) -> Option<&Path> {
        self.source_path.as_deref().and_then(Path::parent)
    }

    /// Deterministic display ordering: scope, then kind, then source path,
    /// then label.
    pub fn sort_key(&self) -> (&str, TaskKind, Option<&Path>, &str) {
        (&self.scope, self.kind, self.source_path.as_deref(), &self.label)
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.label == other.label
            && self.command_line == other.command_line
            && self.description == other.description
    }
}

impl Eq for Task {}

impl Hash for Task {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.label.hash(state);
        self.command_line.hash(state);
        self.description.hash(state);
    }
}

/// The (label, description) projection shown in the picker. The pair is the
/// addressing key back to the full task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionItem {
    pub label: String,
    pub description: String,
}

/// One folder of the workspace being scanned
#[derive(Debug, Clone)]
pub struct WorkspaceRoot {
    pub name: String,
    pub path: PathBuf,
}

/// The set of folders loaders scan over
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    roots: Vec<WorkspaceRoot>,
}

impl Workspace {
    pub fn new(roots: Vec<WorkspaceRoot>) -> Self {
        Self { roots }
    }

    /// A workspace with one root, named after the folder itself
    pub fn single(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            roots: vec![WorkspaceRoot { name, path }],
        }
    }

    pub fn roots(&self) -> &[WorkspaceRoot] {
        &self.roots
    }

    /// The root folder enclosing `path`, if any
    pub fn root_of(&self, path: &Path) -> Option<&WorkspaceRoot> {
        self.roots.iter().find(|root| path.starts_with(&root.path))
    }

    /// Path of `path` relative to its enclosing root, for picker descriptions
    pub fn relative_path(&self, path: &Path) -> String {
        match self.root_of(path) {
            Some(root) => path
                .strip_prefix(&root.path)
                .unwrap_or(path)
                .display()
                .to_string(),
            None => path.display().to_string(),
        }
    }
}

/// How a single loader's scan ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Scan completed with this many tasks
    Completed(usize),
    /// Loader is disabled; finished immediately with no I/O
    Skipped,
    /// Batch failure; the loader's list was cleared
    Failed(String),
}

/// Completion event emitted exactly once per loader invocation
#[derive(Debug, Clone)]
pub struct ScanEvent {
    pub kind: TaskKind,
    pub outcome: ScanOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(label: &str, cmd: &str, path: Option<&str>) -> Task {
        Task::new(
            TaskKind::PackageScript,
            label,
            cmd,
            path.map(PathBuf::from),
            "demo",
            "package.json",
        )
    }

    #[test]
    fn test_dedup_ignores_source_path() {
        let a = task("npm run build", "npm run build", Some("/a/package.json"));
        let b = task("npm run build", "npm run build", Some("/b/package.json"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_label_carries_prefix() {
        let t = task("npm run build", "npm run build", None);
        assert_eq!(t.label, "[npm] npm run build");
    }

    #[test]
    fn test_editor_native_flag() {
        let t = Task::new(TaskKind::EditorTask, "compile", "compile", None, "demo", "");
        assert!(t.editor_native);
        let t = task("x", "x", None);
        assert!(!t.editor_native);
    }

    #[test]
    fn test_workspace_relative_path() {
        let ws = Workspace::single("/home/dev/project");
        assert_eq!(
            ws.relative_path(Path::new("/home/dev/project/scripts/run.sh")),
            "scripts/run.sh"
        );
        assert_eq!(ws.roots()[0].name, "project");
    }
}
