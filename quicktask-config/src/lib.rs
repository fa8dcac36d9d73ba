//! Domain-driven configuration management for QuickTask
//!
//! This crate provides modular configuration split by functional domains,
//! with validation, defaults, and environment variable support.

pub mod error;
pub mod globs;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use globs::expand_braces;
pub use loader::ConfigLoader;

// Re-export domain configurations
pub use domains::{
    logging::{LogFormat, LogLevel, LoggingConfig},
    scripts::ScriptsConfig,
    sources::{PackageManager, SourcesConfig},
    terminal::TerminalConfig,
    watcher::WatcherConfig,
    QuickTaskConfig,
};
