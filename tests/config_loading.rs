// tests/config_loading.rs

use std::error::Error;
use std::path::PathBuf;

use watchs::config::{
    init_config, load_and_validate, load_or_create, ConfigOverrides, EngineOptions,
    RawConfigFile, WatchConfiguration, DEFAULT_DEBOUNCE, DEFAULT_SETTLE_DELAY,
};
use watchs::errors::WatchsError;
use watchs_test_utils::{ConfigBuilder, TempProject};

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(project: &TempProject, body: &str) -> PathBuf {
    project.write_file("Watchs.toml", body)
}

#[test]
fn loads_full_file_with_options() -> TestResult {
    let project = TempProject::new();
    project.mkdir("src");
    let path = write_config(
        &project,
        &format!(
            r#"
watch_dir = '{}'
file_types = [".rs", ".toml"]
exclude_paths = ["target", "*.swp"]
command = "cargo test"

[options]
debounce_ms = 250
settle_ms = 0
"#,
            project.root().display()
        ),
    );

    let loaded = load_and_validate(&path)?;

    assert_eq!(loaded.config.root_directory(), project.root());
    assert!(loaded.config.include_extensions().contains(".rs"));
    assert!(loaded.config.include_extensions().contains(".toml"));
    assert_eq!(loaded.config.exclude_patterns(), ["target", "*.swp"]);
    assert_eq!(loaded.config.command(), "cargo test");
    assert_eq!(loaded.options.debounce_ms, Some(250));

    let options = EngineOptions::from_millis(loaded.options.debounce_ms, loaded.options.settle_ms);
    assert_eq!(options.debounce.as_millis(), 250);
    assert!(options.settle_delay.is_zero());
    Ok(())
}

#[test]
fn zero_or_missing_debounce_means_default() {
    assert_eq!(EngineOptions::from_millis(Some(0), None).debounce, DEFAULT_DEBOUNCE);
    assert_eq!(EngineOptions::from_millis(None, None), EngineOptions::default());
    assert_eq!(EngineOptions::default().settle_delay, DEFAULT_SETTLE_DELAY);
}

#[test]
fn overrides_replace_only_given_fields() -> TestResult {
    let project = TempProject::new();
    let other = TempProject::new();
    let path = write_config(
        &project,
        &format!(
            "watch_dir = '{}'\nfile_types = [\".go\"]\ncommand = \"go build\"\n",
            project.root().display()
        ),
    );

    let overrides = ConfigOverrides {
        watch_dir: Some(other.root().to_path_buf()),
        command: Some("go test ./...".to_string()),
        ..ConfigOverrides::default()
    };
    let loaded = load_or_create(&path, &overrides)?;

    assert_eq!(loaded.config.root_directory(), other.root());
    assert_eq!(loaded.config.command(), "go test ./...");
    // Not overridden: kept from the file.
    assert!(loaded.config.include_extensions().contains(".go"));
    Ok(())
}

#[test]
fn with_overrides_leaves_receiver_untouched() -> TestResult {
    let project = TempProject::new();
    let cfg = ConfigBuilder::new(project.root(), "make").file_type(".c").build();

    let changed = cfg.with_overrides(&ConfigOverrides {
        command: Some("make test".to_string()),
        ..ConfigOverrides::default()
    })?;

    assert_eq!(cfg.command(), "make");
    assert_eq!(changed.command(), "make test");
    assert_eq!(changed.include_extensions(), cfg.include_extensions());
    Ok(())
}

#[test]
fn missing_file_with_dir_and_cmd_builds_from_flags() -> TestResult {
    let project = TempProject::new();
    let overrides = ConfigOverrides {
        watch_dir: Some(project.root().to_path_buf()),
        file_types: Some(vec![".py".to_string()]),
        command: Some("pytest".to_string()),
        ..ConfigOverrides::default()
    };

    let loaded = load_or_create(project.path("missing.toml"), &overrides)?;

    assert_eq!(loaded.config.command(), "pytest");
    assert!(loaded.config.include_extensions().contains(".py"));
    assert!(loaded.options.is_empty());
    Ok(())
}

#[test]
fn missing_file_without_flags_is_config_error() {
    let project = TempProject::new();
    let overrides = ConfigOverrides {
        command: Some("pytest".to_string()),
        ..ConfigOverrides::default()
    };

    match load_or_create(project.path("missing.toml"), &overrides) {
        Err(WatchsError::Config(msg)) => assert!(msg.contains("not found")),
        other => panic!("Expected Config error, got: {:?}", other),
    }
}

#[test]
fn empty_command_is_rejected() {
    let project = TempProject::new();
    let result = WatchConfiguration::new(project.root(), Vec::<String>::new(), Vec::<String>::new(), "   ");
    assert!(matches!(result, Err(WatchsError::EmptyCommand)));
}

#[test]
fn missing_root_is_rejected() {
    let project = TempProject::new();
    let result = WatchConfiguration::new(
        project.path("nope"),
        Vec::<String>::new(),
        Vec::<String>::new(),
        "true",
    );
    assert!(matches!(result, Err(WatchsError::RootNotFound(_))));
}

#[test]
fn file_root_is_rejected() {
    let project = TempProject::new();
    let file = project.write_file("plain.txt", "hi");
    let result = WatchConfiguration::new(file, Vec::<String>::new(), Vec::<String>::new(), "true");
    assert!(matches!(result, Err(WatchsError::NotADirectory(_))));
}

#[test]
fn blank_watch_dir_in_file_is_config_error() -> TestResult {
    let project = TempProject::new();
    let path = write_config(&project, "command = \"make\"\n");

    match load_and_validate(&path) {
        Err(WatchsError::Config(msg)) => assert!(msg.contains("watch_dir")),
        other => panic!("Expected Config error, got: {:?}", other),
    }
    Ok(())
}

#[test]
fn malformed_toml_is_reported() {
    let project = TempProject::new();
    let path = write_config(&project, "watch_dir = [unclosed\n");
    assert!(matches!(load_and_validate(&path), Err(WatchsError::TomlDe(_))));
}

#[test]
fn init_writes_file_and_refuses_to_overwrite() -> TestResult {
    let project = TempProject::new();
    let path = project.path("conf/Watchs.toml");
    let raw = ConfigBuilder::new(project.root(), "echo files changed")
        .file_type(".go")
        .exclude("vendor")
        .raw();

    let cfg = init_config(&path, raw.clone(), false)?;
    assert_eq!(cfg.command(), "echo files changed");

    let reloaded = load_and_validate(&path)?;
    assert_eq!(reloaded.config, cfg);

    match init_config(&path, raw.clone(), false) {
        Err(WatchsError::ConfigExists(p)) => assert_eq!(p, path),
        other => panic!("Expected ConfigExists error, got: {:?}", other),
    }

    let replaced = RawConfigFile {
        command: "go vet ./...".to_string(),
        ..raw
    };
    init_config(&path, replaced, true)?;
    assert_eq!(load_and_validate(&path)?.config.command(), "go vet ./...");
    Ok(())
}

#[test]
fn init_validates_before_writing() {
    let project = TempProject::new();
    let path = project.path("Watchs.toml");
    let raw = ConfigBuilder::new(project.path("missing"), "make").raw();

    assert!(matches!(
        init_config(&path, raw, false),
        Err(WatchsError::RootNotFound(_))
    ));
    assert!(!path.exists());
}
