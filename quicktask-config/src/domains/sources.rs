//! Task source configuration: enable flags and discovery globs per kind

use crate::error::ConfigResult;
use crate::globs::validate_glob;
use crate::validation::{validate_positive, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};

/// Configuration for all task sources
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Build-tool config scanner (gulp)
    #[serde(default)]
    pub build_tool: BuildToolSourceConfig,

    /// Package manifest scanner (npm/yarn scripts)
    #[serde(default)]
    pub package: PackageSourceConfig,

    /// Editor task-definition scanner (.vscode/tasks.json)
    #[serde(default)]
    pub editor: EditorSourceConfig,

    /// Standalone script scanner
    #[serde(default)]
    pub script: ScriptSourceConfig,

    /// Static user-defined task list, emitted verbatim
    #[serde(default)]
    pub user_tasks: Vec<String>,

    /// Glob excluded from every scanner's discovery
    #[serde(default = "default_exclude_glob")]
    pub exclude_glob: String,

    /// When true, source globs are prefixed with `**/` so task files are
    /// found in subdirectories as well as workspace roots
    #[serde(default = "crate::domains::utils::default_false")]
    pub search_subdirectories: bool,
}

/// Build-tool scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildToolSourceConfig {
    #[serde(default = "crate::domains::utils::default_true")]
    pub enabled: bool,

    /// Glob matching build-tool config files. The default covers the
    /// primary and alternate gulpfile spellings; when several coexist in
    /// one directory only the most specific is processed.
    #[serde(default = "default_build_tool_glob")]
    pub glob: String,

    /// Timeout for the build tool's own "list tasks" invocation, in seconds.
    /// On timeout the loader falls back to a textual scan of the config file.
    #[serde(default = "default_list_timeout_secs")]
    pub list_timeout_secs: u64,
}

/// Package manifest scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageSourceConfig {
    #[serde(default = "crate::domains::utils::default_true")]
    pub enabled: bool,

    #[serde(default = "default_package_glob")]
    pub glob: String,

    /// Which package manager to emit run commands for
    #[serde(default)]
    pub manager: PackageManager,
}

/// Editor task file scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSourceConfig {
    #[serde(default = "crate::domains::utils::default_true")]
    pub enabled: bool,

    /// Path of the task-definition file relative to each workspace root
    #[serde(default = "default_editor_task_file")]
    pub task_file: String,
}

/// Standalone script scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptSourceConfig {
    #[serde(default = "crate::domains::utils::default_true")]
    pub enabled: bool,

    #[serde(default = "default_script_glob")]
    pub glob: String,
}

/// Package manager preference for script commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Npm,
    Yarn,
}

impl PackageManager {
    /// The command prefix emitted for a manifest script entry
    pub fn run_prefix(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm run",
            PackageManager::Yarn => "yarn run",
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            build_tool: BuildToolSourceConfig::default(),
            package: PackageSourceConfig::default(),
            editor: EditorSourceConfig::default(),
            script: ScriptSourceConfig::default(),
            user_tasks: Vec::new(),
            exclude_glob: default_exclude_glob(),
            search_subdirectories: false,
        }
    }
}

impl Default for BuildToolSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            glob: default_build_tool_glob(),
            list_timeout_secs: default_list_timeout_secs(),
        }
    }
}

impl Default for PackageSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            glob: default_package_glob(),
            manager: PackageManager::default(),
        }
    }
}

impl Default for EditorSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            task_file: default_editor_task_file(),
        }
    }
}

impl Default for ScriptSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            glob: default_script_glob(),
        }
    }
}

impl Validatable for SourcesConfig {
    fn validate(&self) -> ConfigResult<()> {
        let domain = self.domain_name();

        validate_glob(&self.build_tool.glob, "build_tool.glob", domain)?;
        validate_glob(&self.package.glob, "package.glob", domain)?;
        validate_glob(&self.script.glob, "script.glob", domain)?;
        validate_glob(&self.exclude_glob, "exclude_glob", domain)?;

        validate_required_string(&self.editor.task_file, "editor.task_file", domain)?;
        validate_positive(
            self.build_tool.list_timeout_secs,
            "build_tool.list_timeout_secs",
            domain,
        )?;

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "sources"
    }
}

// Default value functions
fn default_build_tool_glob() -> String {
    "gulpfile{,.babel}.{js,ts}".to_string()
}

fn default_package_glob() -> String {
    "package.json".to_string()
}

fn default_editor_task_file() -> String {
    ".vscode/tasks.json".to_string()
}

fn default_script_glob() -> String {
    "*.{sh,py,rb,ps1,pl,bat,cmd,vbs,ahk}".to_string()
}

fn default_exclude_glob() -> String {
    "**/node_modules/**".to_string()
}

fn default_list_timeout_secs() -> u64 {
    10
}
