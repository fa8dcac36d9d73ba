//! Interpreter table for standalone scripts
//!
//! Each recognized file extension maps to an enable flag and an interpreter
//! prefix. An empty prefix means the file is executed directly.

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// One interpreter entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    #[serde(default = "crate::domains::utils::default_true")]
    pub enabled: bool,

    /// Command prefix placed before the script path; empty = direct execution
    #[serde(default)]
    pub command: String,
}

impl InterpreterConfig {
    fn new(enabled: bool, command: &str) -> Self {
        Self {
            enabled,
            command: command.to_string(),
        }
    }
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self::new(true, "")
    }
}

/// Interpreter table for all supported script types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    pub shell: InterpreterConfig,
    pub python: InterpreterConfig,
    pub ruby: InterpreterConfig,
    pub powershell: InterpreterConfig,
    pub perl: InterpreterConfig,
    pub batch: InterpreterConfig,
    pub vbscript: InterpreterConfig,
    pub autohotkey: InterpreterConfig,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            shell: InterpreterConfig::new(true, ""),
            python: InterpreterConfig::new(true, "python"),
            ruby: InterpreterConfig::new(true, "ruby"),
            powershell: InterpreterConfig::new(true, "powershell"),
            perl: InterpreterConfig::new(true, "perl"),
            batch: InterpreterConfig::new(true, "cmd.exe /c"),
            vbscript: InterpreterConfig::new(true, "cscript"),
            autohotkey: InterpreterConfig::new(true, "autohotkey"),
        }
    }
}

impl ScriptsConfig {
    /// Look up the interpreter entry for a file extension, lowercase
    pub fn for_extension(&self, ext: &str) -> Option<&InterpreterConfig> {
        match ext {
            "sh" => Some(&self.shell),
            "py" => Some(&self.python),
            "rb" => Some(&self.ruby),
            "ps1" => Some(&self.powershell),
            "pl" => Some(&self.perl),
            "bat" | "cmd" => Some(&self.batch),
            "vbs" => Some(&self.vbscript),
            "ahk" => Some(&self.autohotkey),
            _ => None,
        }
    }
}

impl Validatable for ScriptsConfig {
    fn validate(&self) -> ConfigResult<()> {
        // Any command string, including an empty one, is acceptable
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "scripts"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_lookup() {
        let config = ScriptsConfig::default();
        assert_eq!(config.for_extension("sh").unwrap().command, "");
        assert_eq!(config.for_extension("py").unwrap().command, "python");
        assert_eq!(config.for_extension("cmd").unwrap().command, "cmd.exe /c");
        assert!(config.for_extension("exe").is_none());
    }
}
