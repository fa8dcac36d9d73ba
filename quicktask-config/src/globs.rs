//! Brace expansion for glob patterns
//!
//! Source globs in the configuration use `{a,b}` alternation
//! (e.g. `*.{sh,py,rb}`), which the `glob` crate does not understand.
//! Patterns are expanded into plain alternatives before matching.

use crate::error::{ConfigError, ConfigResult};

/// Expand one or more `{a,b,c}` groups into the cartesian product of
/// plain glob patterns. A pattern without braces expands to itself.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };

    let Some(close) = pattern[open..].find('}').map(|i| open + i) else {
        // Unbalanced brace, treat literally
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    let mut expanded = Vec::new();

    for alternative in pattern[open + 1..close].split(',') {
        let candidate = format!("{}{}{}", prefix, alternative, suffix);
        // Recurse for any remaining groups in the suffix
        expanded.extend(expand_braces(&candidate));
    }

    expanded
}

/// Validate that every expansion of `pattern` is a well-formed glob.
pub fn validate_glob(pattern: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if pattern.is_empty() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} cannot be empty", field_name),
        });
    }

    for expansion in expand_braces(pattern) {
        glob::Pattern::new(&expansion).map_err(|e| ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} has invalid glob '{}': {}", field_name, expansion, e),
        })?;
    }

    Ok(())
}
