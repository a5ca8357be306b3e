// tests/monitor.rs

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use watchs::watch::{DirectoryMonitor, FileEvent, FileEventKind, MatchPolicy};
use watchs_test_utils::{init_tracing, settle_watcher, wait_until, with_timeout, TempProject};

type TestResult = Result<(), Box<dyn Error>>;
type Seen = Arc<Mutex<Vec<FileEvent>>>;

fn monitor_for(project: &TempProject, includes: &[&str], excludes: &[&str]) -> DirectoryMonitor {
    let excludes: Vec<String> = excludes.iter().map(|s| s.to_string()).collect();
    let policy = MatchPolicy::new(project.root(), includes.iter().copied(), &excludes);
    DirectoryMonitor::new(project.root(), policy)
}

fn record_into(monitor: &DirectoryMonitor) -> Seen {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    monitor.on_file_event(move |event| {
        let sink = Arc::clone(&sink);
        async move {
            sink.lock().unwrap().push(event);
            Ok(())
        }
    });
    seen
}

fn saw_path(seen: &Seen, path: &Path) -> bool {
    seen.lock().unwrap().iter().any(|e| e.path == path)
}

#[tokio::test]
async fn created_file_is_reported() -> TestResult {
    init_tracing();
    let project = TempProject::new();
    let monitor = monitor_for(&project, &[], &[]);
    let seen = record_into(&monitor);

    monitor.start().await?;
    settle_watcher().await;

    let file = project.write_file("hello.txt", "hi");

    assert!(wait_until(Duration::from_secs(5), || saw_path(&seen, &file)).await);
    let kinds: Vec<FileEventKind> = seen
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.path == file)
        .map(|e| e.kind)
        .collect();
    assert!(kinds.iter().any(|k| k.is_trigger()), "got {kinds:?}");

    monitor.stop().await?;
    Ok(())
}

#[tokio::test]
async fn new_subdirectory_is_watched_including_early_files() -> TestResult {
    init_tracing();
    let project = TempProject::new();
    let monitor = monitor_for(&project, &[".go"], &[]);
    let seen = record_into(&monitor);

    monitor.start().await?;
    settle_watcher().await;

    // Directory and file created back to back: the file may land before the
    // directory's watch exists.
    let file = project.write_file("pkg/new/main.go", "package main");

    assert!(wait_until(Duration::from_secs(5), || saw_path(&seen, &file)).await);
    assert!(monitor.watched_directories().contains(&project.path("pkg/new")));

    // Later writes inside the new directory are seen too.
    let later = project.write_file("pkg/new/util.go", "package main");
    assert!(wait_until(Duration::from_secs(5), || saw_path(&seen, &later)).await);

    monitor.stop().await?;
    Ok(())
}

#[tokio::test]
async fn excluded_directory_is_never_watched() -> TestResult {
    init_tracing();
    let project = TempProject::new();
    project.mkdir("vendor/lib");
    project.mkdir("src");

    let monitor = monitor_for(&project, &[".go"], &["vendor"]);
    let seen = record_into(&monitor);
    monitor.start().await?;

    let watched = monitor.watched_directories();
    assert!(watched.contains(&project.root().to_path_buf()));
    assert!(watched.contains(&project.path("src")));
    assert!(!watched.iter().any(|d| d.starts_with(project.path("vendor"))));

    settle_watcher().await;
    project.write_file("vendor/lib/x.go", "package lib");
    project.write_file("notes.txt", "ignored extension");
    let wanted = project.write_file("src/main.go", "package main");

    assert!(wait_until(Duration::from_secs(5), || saw_path(&seen, &wanted)).await);
    // Give stragglers a chance to arrive before asserting their absence.
    tokio::time::sleep(Duration::from_millis(300)).await;
    let paths: Vec<PathBuf> = seen.lock().unwrap().iter().map(|e| e.path.clone()).collect();
    assert!(paths.iter().all(|p| p == &wanted), "unexpected events: {paths:?}");

    monitor.stop().await?;
    Ok(())
}

#[tokio::test]
async fn handlers_run_in_order_and_failures_are_isolated() -> TestResult {
    init_tracing();
    let project = TempProject::new();
    let monitor = monitor_for(&project, &[], &[]);

    let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    for tag in ["first", "second", "third"] {
        let order = Arc::clone(&order);
        monitor.on_file_event(move |_event| {
            let order = Arc::clone(&order);
            async move {
                order.lock().unwrap().push(tag);
                if tag == "first" {
                    return Err(anyhow::anyhow!("handler exploded"));
                }
                Ok(())
            }
        });
    }
    let seen = record_into(&monitor);

    monitor.start().await?;
    settle_watcher().await;

    let first = project.write_file("a.txt", "1");
    assert!(wait_until(Duration::from_secs(5), || saw_path(&seen, &first)).await);

    // The monitor keeps going after the error.
    let second = project.write_file("b.txt", "2");
    assert!(wait_until(Duration::from_secs(5), || saw_path(&seen, &second)).await);

    monitor.stop().await?;

    let order = order.lock().unwrap().clone();
    assert!(order.len() >= 6, "got {order:?}");
    let expected = ["first", "second", "third"];
    for (i, tag) in order.iter().enumerate() {
        assert_eq!(*tag, expected[i % 3], "out of order at {i}: {order:?}");
    }
    Ok(())
}

#[tokio::test]
async fn removed_directory_is_retired() -> TestResult {
    init_tracing();
    let project = TempProject::new();
    project.mkdir("gone/deeper");
    let monitor = monitor_for(&project, &[], &[]);
    let _seen = record_into(&monitor);

    monitor.start().await?;
    assert!(monitor.watched_directories().contains(&project.path("gone/deeper")));
    settle_watcher().await;

    std::fs::remove_dir_all(project.path("gone"))?;

    let gone = project.path("gone");
    assert!(
        wait_until(Duration::from_secs(5), || {
            !monitor.watched_directories().iter().any(|d| d.starts_with(&gone))
        })
        .await
    );

    monitor.stop().await?;
    Ok(())
}

#[tokio::test]
async fn start_and_stop_are_idempotent() -> TestResult {
    init_tracing();
    let project = TempProject::new();
    let monitor = monitor_for(&project, &[], &[]);
    let seen = record_into(&monitor);

    // Stop before start is a no-op.
    monitor.stop().await?;
    assert!(!monitor.is_running().await);

    monitor.start().await?;
    monitor.start().await?;
    assert!(monitor.is_running().await);

    with_timeout(monitor.stop()).await?;
    with_timeout(monitor.stop()).await?;
    assert!(!monitor.is_running().await);
    assert!(monitor.watched_directories().is_empty());

    project.write_file("after-stop.txt", "x");
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(seen.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn missing_root_fails_to_start() {
    init_tracing();
    let project = TempProject::new();
    let root = project.path("does-not-exist");
    let monitor = DirectoryMonitor::new(&root, MatchPolicy::new(&root, Vec::<String>::new(), &[]));

    assert!(monitor.start().await.is_err());
    assert!(!monitor.is_running().await);
}
