//! Integration tests for quicktask-config

use quicktask_config::domains::logging::{LogFormat, LogLevel};
use quicktask_config::domains::sources::PackageManager;
use quicktask_config::*;
use temp_env::with_vars;

#[test]
fn test_default_config_validation() {
    let config = QuickTaskConfig::default();
    assert!(config.validate_all().is_ok());
}

#[test]
fn test_config_loader_from_env() {
    let vars = vec![
        ("QUICKTASK_PACKAGE_MANAGER", Some("yarn")),
        ("QUICKTASK_SEARCH_SUBDIRECTORIES", Some("true")),
        ("QUICKTASK_CLOSE_AFTER_RUN", Some("true")),
        ("QUICKTASK_LOG_LEVEL", Some("debug")),
    ];

    with_vars(vars, || {
        let loader = ConfigLoader::new();
        let config = loader.from_env().unwrap();

        assert_eq!(config.sources.package.manager, PackageManager::Yarn);
        assert!(config.sources.search_subdirectories);
        assert!(config.terminal.close_after_run);
        assert_eq!(config.logging.level, LogLevel::Debug);
    });
}

#[test]
fn test_yaml_config_serialization() {
    let config = QuickTaskConfig::default();
    let yaml = serde_yaml::to_string(&config).unwrap();

    // Parse it back
    let parsed: QuickTaskConfig = serde_yaml::from_str(&yaml).unwrap();
    assert!(parsed.validate_all().is_ok());
}

#[test]
fn test_comprehensive_config() {
    let yaml = r#"
sources:
  build_tool:
    enabled: false
    list_timeout_secs: 5
  package:
    manager: yarn
  script:
    glob: "*.{sh,py}"
  user_tasks:
    - "make all"
    - "cargo fmt"
  search_subdirectories: true

scripts:
  python:
    command: "python3"
  ruby:
    enabled: false

terminal:
  show_terminal: false
  close_after_run: true
  shell: "/bin/zsh"
  native_task_command: "code --task"

watcher:
  enabled: false
  ignore_patterns:
    - "**/.git/**"

logging:
  level: info
  format: json
"#;

    let config: QuickTaskConfig = serde_yaml::from_str(yaml).unwrap();
    assert!(config.validate_all().is_ok());

    assert!(!config.sources.build_tool.enabled);
    assert_eq!(config.sources.build_tool.list_timeout_secs, 5);
    assert_eq!(config.sources.package.manager, PackageManager::Yarn);
    assert_eq!(config.sources.script.glob, "*.{sh,py}");
    assert_eq!(config.sources.user_tasks.len(), 2);
    assert!(config.sources.search_subdirectories);

    assert_eq!(config.scripts.python.command, "python3");
    assert!(!config.scripts.ruby.enabled);
    // Untouched interpreter entries keep their defaults
    assert_eq!(config.scripts.perl.command, "perl");

    assert!(!config.terminal.show_terminal);
    assert!(config.terminal.close_after_run);
    assert_eq!(config.terminal.shell.as_deref(), Some("/bin/zsh"));
    assert_eq!(
        config.terminal.native_task_command.as_deref(),
        Some("code --task")
    );

    assert!(!config.watcher.enabled);
    assert_eq!(config.logging.level, LogLevel::Info);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_validation_errors() {
    // Empty source glob
    let mut config = QuickTaskConfig::default();
    config.sources.package.glob = String::new();
    assert!(config.validate_all().is_err());

    // Zero timeout for the build tool listing
    config = QuickTaskConfig::default();
    config.sources.build_tool.list_timeout_secs = 0;
    assert!(config.validate_all().is_err());

    // Malformed ignore pattern
    config = QuickTaskConfig::default();
    config.watcher.ignore_patterns = vec!["[".to_string()];
    assert!(config.validate_all().is_err());
}

#[test]
fn test_custom_prefix_loader() {
    let vars = vec![
        ("QTX_SCRIPT_ENABLED", Some("false")),
        ("QTX_EXCLUDE_GLOB", Some("**/target/**")),
    ];

    with_vars(vars, || {
        let loader = ConfigLoader::with_prefix("QTX");
        let config = loader.from_env().unwrap();

        assert!(!config.sources.script.enabled);
        assert_eq!(config.sources.exclude_glob, "**/target/**");
    });
}

#[test]
fn test_file_with_env_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quicktask.yaml");
    std::fs::write(&path, "sources:\n  package:\n    manager: npm\n").unwrap();

    with_vars(vec![("QTY_PACKAGE_MANAGER", Some("yarn"))], || {
        let config = ConfigLoader::with_prefix("QTY").from_file(&path).unwrap();
        // Environment wins over the file
        assert_eq!(config.sources.package.manager, PackageManager::Yarn);
    });
}

#[test]
fn test_generate_sample_config() {
    let sample = QuickTaskConfig::generate_sample();
    assert!(!sample.is_empty());
    assert!(sample.contains("sources:"));
    assert!(sample.contains("scripts:"));
    assert!(sample.contains("terminal:"));
    assert!(sample.contains("watcher:"));
    assert!(sample.contains("logging:"));

    // Verify the sample is valid YAML
    let parsed: QuickTaskConfig = serde_yaml::from_str(&sample).unwrap();
    assert!(parsed.validate_all().is_ok());
}
