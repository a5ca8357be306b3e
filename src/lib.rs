// src/lib.rs

pub mod build_info;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod watch;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::build_info::BuildInfo;
use crate::cli::{CliArgs, Command, InitArgs, WatchArgs};
use crate::config::{
    init_config, load_or_create, split_list, EngineOptions, OptionsSection, RawConfigFile,
    WatchConfiguration,
};
use crate::engine::WatchOrchestrator;

/// High-level entry point used by `main.rs`.
///
/// Dispatches on the subcommand; a bare invocation is treated as `watch`.
pub async fn run(args: CliArgs, build_info: BuildInfo) -> Result<()> {
    match args.command {
        Some(Command::Version) => {
            println!("{build_info}");
            Ok(())
        }
        Some(Command::Init(init)) => run_init(&init),
        Some(Command::Watch(watch)) => run_watch(&watch).await,
        None => run_watch(&args.watch).await,
    }
}

/// Load config, start the engine and block until Ctrl-C / SIGTERM.
async fn run_watch(args: &WatchArgs) -> Result<()> {
    let loaded = load_or_create(&args.config, &args.overrides())?;

    // Flags beat the file's [options] section.
    let options = EngineOptions::from_millis(
        args.debounce.or(loaded.options.debounce_ms),
        args.settle.or(loaded.options.settle_ms),
    );

    if args.dry_run {
        print_dry_run(&loaded.config, options);
        return Ok(());
    }

    let orchestrator = WatchOrchestrator::new(loaded.config, options);
    orchestrator.start().await?;

    shutdown_signal().await;

    orchestrator.stop().await?;
    info!("watchs stopped");
    Ok(())
}

fn run_init(args: &InitArgs) -> Result<()> {
    let raw = RawConfigFile {
        watch_dir: args.dir.clone(),
        file_types: split_list(&args.types),
        exclude_paths: split_list(&args.exclude),
        command: args.cmd.clone(),
        options: OptionsSection::default(),
    };

    let config = init_config(&args.config, raw, args.force)?;

    println!("wrote {}", args.config.display());
    print_config(&config);
    Ok(())
}

/// Resolves when the process is asked to stop.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("interrupt received, shutting down"),
        _ = terminate => info!("terminate signal received, shutting down"),
    }
}

fn print_config(config: &WatchConfiguration) {
    println!("  watch_dir: {}", config.root_directory().display());
    if config.include_extensions().is_empty() {
        println!("  file_types: (all)");
    } else {
        println!("  file_types: {:?}", config.include_extensions());
    }
    if !config.exclude_patterns().is_empty() {
        println!("  exclude_paths: {:?}", config.exclude_patterns());
    }
    println!("  command: {}", config.command());
}

/// Simple dry-run output: print the resolved configuration.
fn print_dry_run(config: &WatchConfiguration, options: EngineOptions) {
    println!("watchs dry-run");
    print_config(config);
    println!("  debounce: {:?}", options.debounce);
    println!("  settle_delay: {:?}", options.settle_delay);

    debug!("dry-run complete (no execution)");
}
