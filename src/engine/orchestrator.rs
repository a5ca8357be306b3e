// src/engine/orchestrator.rs

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{EngineOptions, WatchConfiguration};
use crate::errors::{Result, WatchsError};
use crate::exec::{CommandBackend, CommandExecutor};
use crate::watch::{DirectoryMonitor, MatchPolicy};

/// Lifecycle of a [`WatchOrchestrator`]. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Created,
    Running,
    Stopped,
}

struct Lifecycle {
    state: OrchestratorState,
    handler_registered: bool,
}

/// Ties a [`DirectoryMonitor`] to a [`CommandBackend`] for one configuration.
///
/// On start the command runs once unconditionally, then again (subject to the
/// backend's debounce) after every create/write/remove event that passes the
/// match policy. Renames and permission changes never trigger a run.
pub struct WatchOrchestrator {
    config: Arc<WatchConfiguration>,
    options: EngineOptions,
    monitor: DirectoryMonitor,
    backend: Arc<dyn CommandBackend>,
    lifecycle: Mutex<Lifecycle>,
}

impl std::fmt::Debug for WatchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchOrchestrator")
            .field("config", &self.config)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl WatchOrchestrator {
    /// Orchestrator backed by a real [`CommandExecutor`].
    pub fn new(config: WatchConfiguration, options: EngineOptions) -> Self {
        let executor = Arc::new(CommandExecutor::new(options.debounce));
        Self::with_backend(config, options, executor)
    }

    pub fn with_backend(
        config: WatchConfiguration,
        options: EngineOptions,
        backend: Arc<dyn CommandBackend>,
    ) -> Self {
        let policy = MatchPolicy::from_config(&config);
        let monitor = DirectoryMonitor::new(config.root_directory(), policy);

        Self {
            config: Arc::new(config),
            options,
            monitor,
            backend,
            lifecycle: Mutex::new(Lifecycle {
                state: OrchestratorState::Created,
                handler_registered: false,
            }),
        }
    }

    /// The underlying monitor, e.g. to attach extra event listeners.
    pub fn monitor(&self) -> &DirectoryMonitor {
        &self.monitor
    }

    pub async fn state(&self) -> OrchestratorState {
        self.lifecycle.lock().await.state
    }

    /// Begin watching and perform the initial run.
    ///
    /// No-op while running. Fails if the monitor cannot start (the state
    /// then stays `Created`) or if the orchestrator was already stopped.
    /// A failing initial run is only logged.
    pub async fn start(&self) -> Result<()> {
        let mut life = self.lifecycle.lock().await;
        match life.state {
            OrchestratorState::Running => return Ok(()),
            OrchestratorState::Stopped => return Err(WatchsError::EngineStopped),
            OrchestratorState::Created => {}
        }

        if !life.handler_registered {
            self.register_trigger_handler();
            life.handler_registered = true;
        }

        self.monitor.start().await?;
        life.state = OrchestratorState::Running;

        info!(
            root = %self.config.root_directory().display(),
            command = %self.config.command(),
            include = ?self.config.include_extensions(),
            exclude = ?self.config.exclude_patterns(),
            "watching for changes"
        );

        if let Err(err) = self
            .backend
            .execute(self.config.command(), self.config.root_directory())
            .await
        {
            warn!(error = %err, "initial command run failed");
        }

        Ok(())
    }

    /// Terminate the running command, stop watching and close the backend.
    ///
    /// No-op unless running. Returns only after the command has exited.
    pub async fn stop(&self) -> Result<()> {
        let mut life = self.lifecycle.lock().await;
        if life.state != OrchestratorState::Running {
            return Ok(());
        }

        info!("stopping watch engine");

        if let Err(err) = self.backend.terminate().await {
            warn!(error = %err, "failed to terminate running command");
        }

        let stopped = self.monitor.stop().await;
        life.state = OrchestratorState::Stopped;

        // Anything a half-finished handler managed to start dies here.
        if let Err(err) = self.backend.close().await {
            warn!(error = %err, "failed to close command executor");
        }

        stopped
    }

    fn register_trigger_handler(&self) {
        let backend = Arc::clone(&self.backend);
        let config = Arc::clone(&self.config);
        let settle_delay = self.options.settle_delay;

        self.monitor.on_file_event(move |event| {
            let backend = Arc::clone(&backend);
            let config = Arc::clone(&config);

            async move {
                if !event.kind.is_trigger() {
                    debug!(kind = %event.kind, path = %event.path.display(), "event kind does not trigger a run");
                    return Ok(());
                }

                // Let the writer finish before acting on the file.
                tokio::time::sleep(settle_delay).await;

                backend
                    .execute(config.command(), config.root_directory())
                    .await?;
                Ok::<(), anyhow::Error>(())
            }
        });
    }
}
