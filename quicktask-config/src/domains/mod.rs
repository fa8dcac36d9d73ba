//! Domain-specific configuration modules

pub mod logging;
pub mod scripts;
pub mod sources;
pub mod terminal;
pub mod utils;
pub mod watcher;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main QuickTask configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct QuickTaskConfig {
    /// Task source configuration (globs and enable flags)
    #[serde(default)]
    pub sources: sources::SourcesConfig,

    /// Standalone script interpreter table
    #[serde(default)]
    pub scripts: scripts::ScriptsConfig,

    /// Terminal and execution preferences
    #[serde(default)]
    pub terminal: terminal::TerminalConfig,

    /// File watcher configuration
    #[serde(default)]
    pub watcher: watcher::WatcherConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl QuickTaskConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.sources.validate()?;
        self.scripts.validate()?;
        self.terminal.validate()?;
        self.watcher.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = QuickTaskConfig::default();
        serde_yaml::to_string(&config)
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = QuickTaskConfig::default();
        assert!(config.validate_all().is_ok());
    }

    #[test]
    fn test_sample_round_trips() {
        let sample = QuickTaskConfig::generate_sample();
        let parsed: QuickTaskConfig = serde_yaml::from_str(&sample).unwrap();
        assert!(parsed.validate_all().is_ok());
    }
}
