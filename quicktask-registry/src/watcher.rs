//! Filesystem watching that keeps the registry current
//!
//! Raw notify callbacks are forwarded into a tokio channel and consumed by a
//! processor task. The processor routes each changed path to the loaders
//! whose watch pattern matches it and schedules their (already debounced)
//! reloads. The removal of a workspace root itself triggers a full rescan.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::error::{RegistryError, Result};
use crate::registry::TaskRegistry;

use quicktask_config::WatcherConfig;

/// Filesystem change reduced to what reload routing needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FsChange {
    Created,
    Changed,
    Removed,
}

#[derive(Debug, Clone)]
struct FsEvent {
    change: FsChange,
    path: PathBuf,
}

pub struct WorkspaceWatcher {
    watcher: Option<RecommendedWatcher>,
    registry: Arc<TaskRegistry>,
    config: WatcherConfig,
    event_tx: mpsc::UnboundedSender<FsEvent>,
    event_rx: Option<mpsc::UnboundedReceiver<FsEvent>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    processor_handle: Option<tokio::task::JoinHandle<()>>,
}

impl WorkspaceWatcher {
    pub fn new(registry: Arc<TaskRegistry>, config: WatcherConfig) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Self {
            watcher: None,
            registry,
            config,
            event_tx,
            event_rx: Some(event_rx),
            shutdown_tx: None,
            processor_handle: None,
        }
    }

    pub async fn start(&mut self) -> Result<()> {
        if !self.config.enabled {
            info!("Workspace watching is disabled");
            return Ok(());
        }

        let event_tx = self.event_tx.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => Self::forward_notify_event(event, &event_tx),
                Err(e) => error!("Notify error: {}", e),
            },
            Config::default(),
        )
        .map_err(|e| RegistryError::Watcher(format!("Failed to create watcher: {}", e)))?;

        for root in self.registry.workspace().roots() {
            watcher
                .watch(&root.path, RecursiveMode::Recursive)
                .map_err(|e| {
                    RegistryError::Watcher(format!("Failed to watch {:?}: {}", root.path, e))
                })?;
            debug!("Watching workspace root: {:?}", root.path);
        }

        self.watcher = Some(watcher);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);

        if let Some(event_rx) = self.event_rx.take() {
            let processor = EventProcessor::new(self.registry.clone(), &self.config)?;
            let handle = tokio::spawn(async move {
                processor.run(event_rx, shutdown_rx).await;
            });
            self.processor_handle = Some(handle);
        }

        info!("Workspace watcher started");
        Ok(())
    }

    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(handle) = self.processor_handle.take() {
            let _ = timeout(Duration::from_secs(5), handle).await;
        }

        self.watcher = None;
    }

    /// Flatten one notify event into per-path change events. Runs on the
    /// notify callback thread, so it only forwards into the channel.
    fn forward_notify_event(event: Event, event_tx: &mpsc::UnboundedSender<FsEvent>) {
        let change = match event.kind {
            EventKind::Create(_) => FsChange::Created,
            EventKind::Modify(_) => FsChange::Changed,
            EventKind::Remove(_) => FsChange::Removed,
            _ => return,
        };

        for path in event.paths {
            // The receiver only goes away on shutdown
            let _ = event_tx.send(FsEvent { change, path });
        }
    }
}

struct EventProcessor {
    registry: Arc<TaskRegistry>,
    ignores: Vec<glob::Pattern>,
}

impl EventProcessor {
    fn new(registry: Arc<TaskRegistry>, config: &WatcherConfig) -> Result<Self> {
        let mut ignores = Vec::new();
        for pattern in &config.ignore_patterns {
            for expanded in quicktask_config::expand_braces(pattern) {
                ignores.push(glob::Pattern::new(&expanded)?);
            }
        }

        Ok(Self { registry, ignores })
    }

    async fn run(
        self,
        mut event_rx: mpsc::UnboundedReceiver<FsEvent>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                Some(event) = event_rx.recv() => {
                    self.route(event.change, &event.path);
                }

                _ = &mut shutdown_rx => {
                    debug!("Watcher event processor shutting down");
                    break;
                }
            }
        }
    }

    /// Schedule reloads for the loaders a changed path belongs to.
    /// Per-loader debouncing coalesces event bursts, so routing each event
    /// individually is cheap.
    fn route(&self, change: FsChange, path: &Path) {
        if self.is_ignored(path) {
            return;
        }

        // A workspace root disappearing invalidates every loader's view
        if change == FsChange::Removed && self.is_workspace_root(path) {
            info!("Workspace root removed: {:?}, rescanning all sources", path);
            self.registry.reload_all();
            return;
        }

        for loader in self.registry.loaders() {
            let Some(spec) = loader.watch_spec() else {
                continue;
            };
            if change == FsChange::Changed && spec.ignore_change_events {
                continue;
            }
            if spec.pattern.matches(path) {
                debug!("{:?} changed, reloading {}", path, loader.kind().source_name());
                loader.reload();
            }
        }
    }

    fn is_ignored(&self, path: &Path) -> bool {
        self.ignores.iter().any(|p| p.matches_path(path))
    }

    fn is_workspace_root(&self, path: &Path) -> bool {
        self.registry
            .workspace()
            .roots()
            .iter()
            .any(|root| root.path == path)
    }
}
