// src/watch/monitor.rs

use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::errors::Result;
use crate::watch::event::{FileEvent, FileEventKind};
use crate::watch::policy::MatchPolicy;

/// Future returned by an event handler.
pub type HandlerFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// A registered listener for [`FileEvent`]s.
pub type EventHandler = Arc<dyn Fn(FileEvent) -> HandlerFuture + Send + Sync>;

type RawEvent = notify::Result<Event>;

/// Notifier plus the set of directories currently registered with it.
struct Registration {
    watcher: Option<RecommendedWatcher>,
    watched: HashSet<PathBuf>,
}

/// Shared between the public handle and the event-processing task.
struct MonitorShared {
    root: PathBuf,
    policy: MatchPolicy,
    handlers: RwLock<Vec<EventHandler>>,
    registration: Mutex<Registration>,
}

struct Running {
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

/// Watches a directory tree and fans filtered [`FileEvent`]s out to handlers.
///
/// Every directory is registered non-recursively so that excluded subtrees
/// are never watched at all. New directories are picked up as they appear.
///
/// Handlers run one after another on the monitor's single processing task,
/// in registration order. A slow handler delays later events.
pub struct DirectoryMonitor {
    shared: Arc<MonitorShared>,
    running: tokio::sync::Mutex<Option<Running>>,
}

impl std::fmt::Debug for DirectoryMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryMonitor")
            .field("root", &self.shared.root)
            .finish_non_exhaustive()
    }
}

impl DirectoryMonitor {
    pub fn new(root: impl Into<PathBuf>, policy: MatchPolicy) -> Self {
        Self {
            shared: Arc::new(MonitorShared {
                root: root.into(),
                policy,
                handlers: RwLock::new(Vec::new()),
                registration: Mutex::new(Registration {
                    watcher: None,
                    watched: HashSet::new(),
                }),
            }),
            running: tokio::sync::Mutex::new(None),
        }
    }

    pub fn root(&self) -> &Path {
        &self.shared.root
    }

    /// Register a listener. May be called before or after [`start`](Self::start).
    pub fn on_file_event<F, Fut>(&self, handler: F)
    where
        F: Fn(FileEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let handler: EventHandler = Arc::new(move |event| Box::pin(handler(event)));
        self.shared
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handler);
    }

    /// Create the notifier, register the tree and spawn the processing task.
    ///
    /// A no-op while already running. Fails if the notifier cannot be created
    /// or the root cannot be read; individual subdirectories that fail to
    /// register are only logged.
    pub async fn start(&self) -> Result<()> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            debug!("directory monitor already running");
            return Ok(());
        }

        // Surface an unreadable root before anything is spawned.
        std::fs::read_dir(&self.shared.root)?;

        let (event_tx, event_rx) = mpsc::unbounded_channel::<RawEvent>();

        // Called synchronously on notify's own thread; forward everything,
        // errors included, into the async world.
        let watcher = RecommendedWatcher::new(
            move |res: RawEvent| {
                if event_tx.send(res).is_err() {
                    debug!("monitor event channel closed; dropping notify event");
                }
            },
            Config::default(),
        )?;

        {
            let mut reg = self.shared.lock_registration();
            reg.watcher = Some(watcher);
            reg.watched.clear();
        }

        let shared = Arc::clone(&self.shared);
        let root = self.shared.root.clone();
        tokio::task::spawn_blocking(move || shared.register_tree(&root))
            .await
            .map_err(anyhow::Error::from)?;

        info!(
            root = %self.shared.root.display(),
            directories = self.watched_count(),
            "directory monitor started"
        );

        let shutdown = CancellationToken::new();
        let task = tokio::spawn(process_events(
            Arc::clone(&self.shared),
            event_rx,
            shutdown.clone(),
        ));

        *running = Some(Running { shutdown, task });
        Ok(())
    }

    /// Release the notifier and end the processing task. Idempotent.
    ///
    /// An event that is mid-dispatch when this is called is abandoned.
    pub async fn stop(&self) -> Result<()> {
        let Some(Running { shutdown, task }) = self.running.lock().await.take() else {
            return Ok(());
        };

        shutdown.cancel();

        {
            let mut reg = self.shared.lock_registration();
            // Dropping the watcher closes the OS handles and, with them, the
            // sending half of the event channel.
            reg.watcher = None;
            reg.watched.clear();
        }

        if let Err(err) = task.await {
            if !err.is_cancelled() {
                warn!(error = %err, "directory monitor task ended abnormally");
            }
        }

        info!(root = %self.shared.root.display(), "directory monitor stopped");
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// Snapshot of the directories currently registered with the notifier.
    pub fn watched_directories(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self
            .shared
            .lock_registration()
            .watched
            .iter()
            .cloned()
            .collect();
        dirs.sort();
        dirs
    }

    fn watched_count(&self) -> usize {
        self.shared.lock_registration().watched.len()
    }
}

impl MonitorShared {
    fn lock_registration(&self) -> MutexGuard<'_, Registration> {
        self.registration
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Walk `dir`, register every non-excluded directory and return the
    /// files found along the way.
    ///
    /// Best-effort: unreadable entries and failed registrations are logged
    /// and skipped.
    fn register_tree(&self, dir: &Path) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        let mut files = Vec::new();

        let walker = WalkDir::new(dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                !(entry.file_type().is_dir() && self.policy.is_excluded(entry.path()))
            });

        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_dir() => dirs.push(entry.into_path()),
                Ok(entry) => files.push(entry.into_path()),
                Err(err) => warn!(error = %err, "skipping unreadable entry while walking"),
            }
        }

        if dirs.is_empty() && self.policy.is_excluded(dir) {
            debug!(dir = %dir.display(), "directory is excluded; not watching");
        }

        let mut reg = self.lock_registration();
        let Registration { watcher, watched } = &mut *reg;
        let Some(watcher) = watcher.as_mut() else {
            // Stopped while walking.
            return Vec::new();
        };

        for d in dirs {
            if watched.contains(&d) {
                continue;
            }
            match watcher.watch(&d, RecursiveMode::NonRecursive) {
                Ok(()) => {
                    debug!(dir = %d.display(), "watching directory");
                    watched.insert(d);
                }
                Err(err) => warn!(dir = %d.display(), error = %err, "failed to watch directory"),
            }
        }

        files
    }

    /// Drop `path` and everything below it from the watched set. The OS has
    /// already released the watches when the directory disappeared.
    fn retire(&self, path: &Path) {
        let mut reg = self.lock_registration();
        let before = reg.watched.len();
        reg.watched.retain(|d| !d.starts_with(path));
        let retired = before - reg.watched.len();
        if retired > 0 {
            debug!(dir = %path.display(), retired, "retired removed directories");
        }
    }

    fn is_watched(&self, path: &Path) -> bool {
        self.lock_registration().watched.contains(path)
    }

    fn handlers_snapshot(&self) -> Vec<EventHandler> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Turn one raw notification into zero or more dispatched events.
    async fn handle_raw(self: &Arc<Self>, raw: RawEvent) {
        let event = match raw {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "file watch error");
                return;
            }
        };

        let kind = FileEventKind::from_notify(&event.kind);

        for path in event.paths {
            // A directory that just appeared must be registered before
            // anything else, or files created inside it right away are lost.
            let mut discovered = Vec::new();
            if matches!(kind, Some(FileEventKind::Create | FileEventKind::Rename))
                && path.is_dir()
                && !self.is_watched(&path)
            {
                let shared = Arc::clone(self);
                let dir = path.clone();
                match tokio::task::spawn_blocking(move || shared.register_tree(&dir)).await {
                    Ok(files) => discovered = files,
                    Err(err) => warn!(dir = %path.display(), error = %err, "failed to register new directory"),
                }
            }

            if matches!(kind, Some(FileEventKind::Remove | FileEventKind::Rename)) && !path.exists() {
                self.retire(&path);
            }

            if let Some(kind) = kind {
                self.dispatch(path, kind).await;
            }

            // Files that landed in the new directory before its watch did.
            for file in discovered {
                self.dispatch(file, FileEventKind::Create).await;
            }
        }
    }

    async fn dispatch(&self, path: PathBuf, kind: FileEventKind) {
        if !self.policy.should_watch(&path) {
            return;
        }

        let event = FileEvent::new(path, kind);
        info!(kind = %event.kind, path = %event.path.display(), "file changed");

        for handler in self.handlers_snapshot() {
            if let Err(err) = handler(event.clone()).await {
                warn!(
                    kind = %event.kind,
                    path = %event.path.display(),
                    error = %err,
                    "file event handler failed"
                );
            }
        }
    }
}

/// Single consumer of the notifier's output for the monitor's lifetime.
async fn process_events(
    shared: Arc<MonitorShared>,
    mut events: mpsc::UnboundedReceiver<RawEvent>,
    shutdown: CancellationToken,
) {
    loop {
        let raw = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            raw = events.recv() => match raw {
                Some(raw) => raw,
                None => break,
            },
        };

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = shared.handle_raw(raw) => {}
        }
    }

    debug!("directory monitor loop ended");
}
