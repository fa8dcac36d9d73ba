//! File watcher configuration

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Watcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Whether filesystem watching is enabled at all
    #[serde(default = "crate::domains::utils::default_true")]
    pub enabled: bool,

    /// Paths matching these globs never trigger a rescan
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ignore_patterns: default_ignore_patterns(),
        }
    }
}

impl Validatable for WatcherConfig {
    fn validate(&self) -> ConfigResult<()> {
        for pattern in &self.ignore_patterns {
            crate::globs::validate_glob(pattern, "ignore_patterns", self.domain_name())?;
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "watcher"
    }
}

fn default_ignore_patterns() -> Vec<String> {
    vec![
        "**/.git/**".to_string(),
        "**/node_modules/**".to_string(),
        "**/.DS_Store".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watcher_defaults() {
        let config = WatcherConfig::default();
        assert!(config.enabled);
        assert!(!config.ignore_patterns.is_empty());
        assert!(config.validate().is_ok());
    }
}
