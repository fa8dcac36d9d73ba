use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use quicktask_config::{ConfigLoader, LogFormat, LoggingConfig, QuickTaskConfig};
use quicktask_registry::{TaskRegistry, Workspace, WorkspaceRoot, WorkspaceWatcher};

mod cli;
mod history;
mod presenter;
mod runner;

use cli::{Cli, Commands, ConfigCommands};
use history::History;
use presenter::{Presenter, Selection};
use runner::TaskRunner;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config subcommands work without a loaded configuration
    if let Some(Commands::Config { config_cmd }) = &cli.command {
        return handle_config_command(config_cmd);
    }

    let config = ConfigLoader::new()
        .load(cli.config.as_deref())
        .context("failed to load configuration")?;

    init_tracing(&config.logging, cli.log_level.as_deref());

    let workspace = build_workspace(&cli.roots)?;

    match cli.command {
        None => run_show(&config, workspace, false).await,
        Some(Commands::Show { watch }) => run_show(&config, workspace, watch).await,
        Some(Commands::Rescan) => run_rescan(&config, workspace).await,
        Some(Commands::Last) => run_last(&config).await,
        Some(Commands::Config { .. }) => unreachable!("handled above"),
    }
}

/// Scan, present the picker and run the selection. With `watch`, keep
/// serving picks while filesystem changes refresh the registry.
async fn run_show(config: &QuickTaskConfig, workspace: Workspace, watch: bool) -> Result<()> {
    let (registry, events) = TaskRegistry::from_config(config, workspace)?;
    let registry = Arc::new(registry);

    let mut watcher = if watch {
        let mut watcher = WorkspaceWatcher::new(registry.clone(), config.watcher.clone());
        watcher.start().await.context("failed to start the workspace watcher")?;
        Some(watcher)
    } else {
        None
    };

    let runner = TaskRunner::new(config.terminal.clone());
    let history = History::default_location()?;
    let mut presenter = Presenter::new(registry.clone(), events);

    registry.load_all();

    loop {
        presenter.wait_until_ready().await?;

        match presenter.pick().await? {
            Selection::Task(task) => {
                history.remember(&task)?;
                runner.run(&task).await?;
                if !watch {
                    break;
                }
            }
            Selection::Rescan => continue,
            Selection::Quit => break,
        }
    }

    if let Some(watcher) = watcher.as_mut() {
        watcher.stop().await;
    }

    Ok(())
}

/// Force a fresh scan of every source and list what it found
async fn run_rescan(config: &QuickTaskConfig, workspace: Workspace) -> Result<()> {
    let (registry, events) = TaskRegistry::from_config(config, workspace)?;
    let registry = Arc::new(registry);
    let mut presenter = Presenter::new(registry.clone(), events);

    registry.load_all();
    presenter.wait_until_ready().await?;

    for item in registry.selection_items().await {
        if item.description.is_empty() {
            println!("  {}", item.label);
        } else {
            println!("  {}  {}", item.label, item.description.dimmed());
        }
    }

    Ok(())
}

/// Re-run whatever ran last, without scanning
async fn run_last(config: &QuickTaskConfig) -> Result<()> {
    let history = History::default_location()?;

    match history.recall()? {
        Some(task) => TaskRunner::new(config.terminal.clone()).run(&task).await,
        None => {
            println!("{}", "No task has been run yet.".yellow());
            Ok(())
        }
    }
}

fn handle_config_command(command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Validate { config_file } => {
            ConfigLoader::new()
                .from_file(config_file)
                .with_context(|| format!("configuration {:?} is invalid", config_file))?;
            println!("{}", "Configuration is valid.".green());
            Ok(())
        }
        ConfigCommands::Generate { output } => {
            let sample = QuickTaskConfig::generate_sample();
            match output {
                Some(path) => {
                    std::fs::write(path, sample)
                        .with_context(|| format!("failed to write {:?}", path))?;
                    println!("Sample configuration written to {:?}", path);
                }
                None => print!("{}", sample),
            }
            Ok(())
        }
    }
}

/// Workspace roots from the command line, defaulting to the current
/// directory. Roots must exist.
fn build_workspace(roots: &[PathBuf]) -> Result<Workspace> {
    let paths = if roots.is_empty() {
        vec![std::env::current_dir().context("cannot determine the current directory")?]
    } else {
        roots.to_vec()
    };

    let mut resolved = Vec::new();
    for path in paths {
        let path = path
            .canonicalize()
            .with_context(|| format!("workspace root {:?} does not exist", path))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        resolved.push(WorkspaceRoot { name, path });
    }

    Ok(Workspace::new(resolved))
}

fn init_tracing(logging: &LoggingConfig, override_level: Option<&str>) {
    let filter = match override_level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| {
            eprintln!("Invalid log level '{}', using configured level", level);
            EnvFilter::new(logging.level.as_filter())
        }),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(logging.level.as_filter())),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}
