pub mod fixtures;
pub mod recording_backend;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

pub use fixtures::{ConfigBuilder, TempProject};
pub use recording_backend::{RecordedRun, RecordingBackend};

static INIT: Once = Once::new();

/// Install a tracing subscriber once per test binary.
///
/// Output goes through the test writer, so it shows up only for failing
/// tests or under `--nocapture`. The filter comes from `RUST_LOG`, not
/// `WATCHS_LOG`: the binary's own level handling in `watchs::logging` is
/// never involved here.
pub fn init_tracing() {
    INIT.call_once(|| {
        // Crate internals at debug, dependencies (notify, globset) quiet.
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,watchs=debug"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(false)
            .try_init();
    });
}

/// Run a future with a 10-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(10), f)
        .await
        .expect("Test timed out after 10 seconds")
}

/// Poll `cond` every 20ms until it holds or `limit` elapses.
///
/// Returns whether the condition was eventually observed.
pub async fn wait_until<F>(limit: Duration, mut cond: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + limit;
    loop {
        if cond() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Give the OS notifier time to attach its watches.
///
/// Backends like FSEvents deliver nothing for changes made immediately
/// after registration.
pub async fn settle_watcher() {
    tokio::time::sleep(Duration::from_millis(250)).await;
}
