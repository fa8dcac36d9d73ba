//! Configuration loading and environment variable handling

use crate::domains::sources::PackageManager;
use crate::domains::QuickTaskConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use tracing::debug;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "QUICKTASK".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<QuickTaskConfig> {
        debug!("Loading configuration from {:?}", path.as_ref());
        let content = std::fs::read_to_string(path)?;
        let mut config: QuickTaskConfig = serde_yaml::from_str(&content)?;

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<QuickTaskConfig> {
        let mut config = QuickTaskConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<QuickTaskConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut QuickTaskConfig) -> ConfigResult<()> {
        self.apply_sources_overrides(config)?;
        self.apply_terminal_overrides(config)?;
        self.apply_logging_overrides(config)?;
        self.apply_watcher_overrides(config)?;
        Ok(())
    }

    fn apply_sources_overrides(&self, config: &mut QuickTaskConfig) -> ConfigResult<()> {
        if let Ok(enabled) = self.get_env_var("BUILD_TOOL_ENABLED") {
            config.sources.build_tool.enabled = parse_env(&enabled, "BUILD_TOOL_ENABLED")?;
        }
        if let Ok(enabled) = self.get_env_var("PACKAGE_ENABLED") {
            config.sources.package.enabled = parse_env(&enabled, "PACKAGE_ENABLED")?;
        }
        if let Ok(enabled) = self.get_env_var("EDITOR_ENABLED") {
            config.sources.editor.enabled = parse_env(&enabled, "EDITOR_ENABLED")?;
        }
        if let Ok(enabled) = self.get_env_var("SCRIPT_ENABLED") {
            config.sources.script.enabled = parse_env(&enabled, "SCRIPT_ENABLED")?;
        }
        if let Ok(subdirs) = self.get_env_var("SEARCH_SUBDIRECTORIES") {
            config.sources.search_subdirectories = parse_env(&subdirs, "SEARCH_SUBDIRECTORIES")?;
        }
        if let Ok(exclude) = self.get_env_var("EXCLUDE_GLOB") {
            config.sources.exclude_glob = exclude;
        }
        if let Ok(manager) = self.get_env_var("PACKAGE_MANAGER") {
            config.sources.package.manager = match manager.to_ascii_lowercase().as_str() {
                "npm" => PackageManager::Npm,
                "yarn" => PackageManager::Yarn,
                other => {
                    return Err(ConfigError::EnvError(format!(
                        "Invalid PACKAGE_MANAGER: {}",
                        other
                    )))
                }
            };
        }
        Ok(())
    }

    fn apply_terminal_overrides(&self, config: &mut QuickTaskConfig) -> ConfigResult<()> {
        if let Ok(show) = self.get_env_var("SHOW_TERMINAL") {
            config.terminal.show_terminal = parse_env(&show, "SHOW_TERMINAL")?;
        }
        if let Ok(close) = self.get_env_var("CLOSE_AFTER_RUN") {
            config.terminal.close_after_run = parse_env(&close, "CLOSE_AFTER_RUN")?;
        }
        if let Ok(shell) = self.get_env_var("SHELL") {
            config.terminal.shell = Some(shell);
        }
        Ok(())
    }

    fn apply_logging_overrides(&self, config: &mut QuickTaskConfig) -> ConfigResult<()> {
        use std::str::FromStr;

        if let Ok(level) = self.get_env_var("LOG_LEVEL") {
            config.logging.level = crate::domains::logging::LogLevel::from_str(&level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", level)))?;
        }
        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.logging.format = crate::domains::logging::LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }
        Ok(())
    }

    fn apply_watcher_overrides(&self, config: &mut QuickTaskConfig) -> ConfigResult<()> {
        if let Ok(enabled) = self.get_env_var("WATCHER_ENABLED") {
            config.watcher.enabled = parse_env(&enabled, "WATCHER_ENABLED")?;
        }
        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

fn parse_env<T>(value: &str, name: &str) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| ConfigError::EnvError(format!("Invalid {}: {}", name, e)))
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
