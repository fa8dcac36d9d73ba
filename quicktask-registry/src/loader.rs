//! Loader lifecycle orchestration
//!
//! [`Loader`] wraps one [`TaskLoader`] implementation with the shared
//! lifecycle: reset on every scan, a fast path for disabled loaders, a
//! completion event sent exactly once per invocation (success, failure or
//! skip), and debounced reloads. Scans of one loader are serialized; a
//! reload requested while a scan is in flight queues behind it instead of
//! racing it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{debug, warn};

use crate::loaders::{TaskLoader, WatchSpec};
use crate::types::{ScanEvent, ScanOutcome, Task, TaskKind, Workspace};

/// Trailing-edge delay coalescing rapid successive reload requests.
/// Tuning, not policy; deliberately not a public setting.
const RELOAD_DEBOUNCE: Duration = Duration::from_millis(10);

/// Receiving side of the shared completion channel
pub type ScanEvents = mpsc::UnboundedReceiver<ScanEvent>;

/// A task source with its runtime state
#[derive(Clone)]
pub struct Loader {
    inner: Arc<dyn TaskLoader>,
    workspace: Arc<Workspace>,
    tasks: Arc<RwLock<Vec<Task>>>,
    /// Cleared the moment a scan or reload is requested, so readiness
    /// checks see the pending work before it starts
    finished: Arc<AtomicBool>,
    scan_permit: Arc<Mutex<()>>,
    reload_seq: Arc<AtomicU64>,
    events: mpsc::UnboundedSender<ScanEvent>,
}

impl Loader {
    pub fn new(
        inner: Arc<dyn TaskLoader>,
        workspace: Arc<Workspace>,
        events: mpsc::UnboundedSender<ScanEvent>,
    ) -> Self {
        Self {
            inner,
            workspace,
            tasks: Arc::new(RwLock::new(Vec::new())),
            finished: Arc::new(AtomicBool::new(false)),
            scan_permit: Arc::new(Mutex::new(())),
            reload_seq: Arc::new(AtomicU64::new(0)),
            events,
        }
    }

    pub fn kind(&self) -> TaskKind {
        self.inner.kind()
    }

    pub fn watch_spec(&self) -> Option<WatchSpec> {
        self.inner.watch_spec()
    }

    /// Current task list (wholesale-replaced per scan)
    pub async fn tasks(&self) -> Vec<Task> {
        self.tasks.read().await.clone()
    }

    /// True if disabled or the last requested scan completed. A pending
    /// reload already reads as unfinished.
    pub fn is_finished(&self) -> bool {
        if !self.inner.enabled() {
            return true;
        }
        self.finished.load(Ordering::SeqCst)
    }

    /// Run one full scan lifecycle. Ends by marking the loader finished and
    /// emitting exactly one completion event, on every path.
    pub async fn load(&self) {
        let _permit = self.scan_permit.lock().await;

        // A reload arriving during this scan bumps the sequence; in that
        // case the loader must stay unfinished until the queued scan runs
        let seq = self.reload_seq.load(Ordering::SeqCst);

        self.finished.store(false, Ordering::SeqCst);
        self.tasks.write().await.clear();

        let kind = self.inner.kind();

        if !self.inner.enabled() {
            self.finish_if_current(seq);
            self.emit(kind, ScanOutcome::Skipped);
            return;
        }

        let outcome = match self.inner.scan(&self.workspace).await {
            Ok(tasks) => {
                let count = tasks.len();
                debug!("Scanned {}: {} task(s)", kind.source_name(), count);
                *self.tasks.write().await = tasks;
                ScanOutcome::Completed(count)
            }
            Err(e) => {
                warn!("Error when scanning {}: {}", kind.source_name(), e);
                self.tasks.write().await.clear();
                ScanOutcome::Failed(e.to_string())
            }
        };

        self.finish_if_current(seq);
        self.emit(kind, outcome);
    }

    fn finish_if_current(&self, seq: u64) {
        if self.reload_seq.load(Ordering::SeqCst) == seq {
            self.finished.store(true, Ordering::SeqCst);
        }
    }

    /// Start a scan without waiting for it
    pub fn spawn_load(&self) {
        let this = self.clone();
        tokio::spawn(async move { this.load().await });
    }

    /// Schedule a fresh scan, debounced so rapid successive filesystem
    /// events coalesce into one. The loader reads as unfinished from this
    /// call on, not only once the queued scan starts, so readiness drops
    /// back to scanning immediately.
    pub fn reload(&self) {
        // Bump first: a scan completing after this point sees a stale
        // sequence and leaves the finished flag alone
        let seq = self.reload_seq.fetch_add(1, Ordering::SeqCst) + 1;
        if self.inner.enabled() {
            self.finished.store(false, Ordering::SeqCst);
        }

        let this = self.clone();

        tokio::spawn(async move {
            tokio::time::sleep(RELOAD_DEBOUNCE).await;
            // Only the newest request survives the debounce window
            if this.reload_seq.load(Ordering::SeqCst) == seq {
                this.load().await;
            }
        });
    }

    fn emit(&self, kind: TaskKind, outcome: ScanOutcome) {
        // The receiver may be gone during shutdown; that is fine
        let _ = self.events.send(ScanEvent { kind, outcome });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    struct StubLoader {
        enabled: bool,
        tasks: Vec<Task>,
        fail: bool,
        scan_calls: AtomicUsize,
    }

    impl StubLoader {
        fn new(enabled: bool, tasks: Vec<Task>) -> Self {
            Self {
                enabled,
                tasks,
                fail: false,
                scan_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TaskLoader for StubLoader {
        fn kind(&self) -> TaskKind {
            TaskKind::UserDefined
        }

        fn enabled(&self) -> bool {
            self.enabled
        }

        async fn scan(&self, _workspace: &Workspace) -> Result<Vec<Task>> {
            self.scan_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(crate::error::RegistryError::Scan("boom".into()));
            }
            Ok(self.tasks.clone())
        }
    }

    fn make_task(label: &str) -> Task {
        Task::new(TaskKind::UserDefined, label, label, None, "ws", "d")
    }

    fn loader_for(stub: StubLoader) -> (Loader, Arc<StubLoader>, ScanEvents) {
        let (tx, rx) = mpsc::unbounded_channel();
        let stub = Arc::new(stub);
        let loader = Loader::new(stub.clone(), Arc::new(Workspace::default()), tx);
        (loader, stub, rx)
    }

    #[tokio::test]
    async fn test_disabled_loader_finishes_without_io() {
        let (loader, stub, mut events) = loader_for(StubLoader::new(false, vec![make_task("x")]));

        loader.load().await;

        assert!(loader.is_finished());
        assert!(loader.tasks().await.is_empty());
        assert_eq!(stub.scan_calls.load(Ordering::SeqCst), 0);

        let event = events.recv().await.unwrap();
        assert_eq!(event.outcome, ScanOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_successful_scan_emits_one_event() {
        let (loader, _stub, mut events) =
            loader_for(StubLoader::new(true, vec![make_task("a"), make_task("b")]));

        loader.load().await;

        assert!(loader.is_finished());
        assert_eq!(loader.tasks().await.len(), 2);
        assert_eq!(events.recv().await.unwrap().outcome, ScanOutcome::Completed(2));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_scan_clears_list_and_still_finishes() {
        let mut stub = StubLoader::new(true, vec![make_task("a")]);
        stub.fail = true;
        let (loader, _stub, mut events) = loader_for(stub);

        loader.load().await;

        assert!(loader.is_finished());
        assert!(loader.tasks().await.is_empty());
        assert!(matches!(
            events.recv().await.unwrap().outcome,
            ScanOutcome::Failed(_)
        ));
    }

    #[tokio::test]
    async fn test_reload_debounce_coalesces() {
        let (loader, stub, mut events) = loader_for(StubLoader::new(true, vec![make_task("a")]));

        for _ in 0..5 {
            loader.reload();
        }

        // Only the last request survives the debounce window
        let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.outcome, ScanOutcome::Completed(1));

        tokio::time::sleep(RELOAD_DEBOUNCE * 3).await;
        assert_eq!(stub.scan_calls.load(Ordering::SeqCst), 1);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_reload_reads_unfinished_before_scan_starts() {
        let (loader, stub, mut events) = loader_for(StubLoader::new(true, vec![make_task("a")]));

        loader.load().await;
        assert!(loader.is_finished());

        // Unfinished from the request itself, during the debounce window
        loader.reload();
        assert!(!loader.is_finished());
        assert_eq!(stub.scan_calls.load(Ordering::SeqCst), 1);

        // Initial load's event, then the reload's
        assert!(events.recv().await.is_some());
        tokio::time::timeout(Duration::from_secs(1), events.recv())
            .await
            .expect("reload scan never completed")
            .unwrap();
        assert!(loader.is_finished());
    }

    #[tokio::test]
    async fn test_each_invocation_replaces_wholesale() {
        let (loader, _stub, mut events) = loader_for(StubLoader::new(true, vec![make_task("a")]));

        loader.load().await;
        loader.load().await;

        assert_eq!(loader.tasks().await.len(), 1);
        // One event per invocation
        assert!(events.recv().await.is_some());
        assert!(events.recv().await.is_some());
        assert!(events.try_recv().is_err());
    }
}
