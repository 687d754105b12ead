//! Unit tests for configuration and graceful degradation
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate WSPM_ROOT_FOLDER or WSPM_ROOT are marked with #[serial]
//! to ensure they run sequentially, not in parallel.

use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;
use wspm_common::config::{
    CompiledDefaults, LoggingConfig, RootFolderInitializer, RootFolderResolver, TomlConfig,
    DATABASE_FILE, LEGACY_ROOT_ENV, ROOT_FOLDER_ENV,
};

fn clear_root_env() {
    env::remove_var(ROOT_FOLDER_ENV);
    env::remove_var(LEGACY_ROOT_ENV);
}

/// Resolver pointed at a config path that does not exist
fn isolated_resolver(dir: &TempDir) -> RootFolderResolver {
    RootFolderResolver::new("wspm-pe").with_config_path(dir.path().join("absent.toml"))
}

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert_eq!(defaults.log_level, "info");
    assert!(defaults.log_file.is_none());
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    clear_root_env();
    let dir = TempDir::new().unwrap();

    let resolved = isolated_resolver(&dir).resolve();
    assert_eq!(resolved, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_resolver_cli_arg_wins_over_env() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/from-env");
    let dir = TempDir::new().unwrap();

    let resolved = isolated_resolver(&dir)
        .with_cli_arg(Some(PathBuf::from("/tmp/from-cli")))
        .resolve();
    assert_eq!(resolved, PathBuf::from("/tmp/from-cli"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_env_var_root_folder() {
    clear_root_env();
    env::set_var(ROOT_FOLDER_ENV, "/tmp/wspm-root-folder");
    let dir = TempDir::new().unwrap();

    assert_eq!(
        isolated_resolver(&dir).resolve(),
        PathBuf::from("/tmp/wspm-root-folder")
    );

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_legacy_env_var() {
    clear_root_env();
    env::set_var(LEGACY_ROOT_ENV, "/tmp/wspm-legacy");
    let dir = TempDir::new().unwrap();

    assert_eq!(isolated_resolver(&dir).resolve(), PathBuf::from("/tmp/wspm-legacy"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_primary_env_takes_precedence() {
    clear_root_env();
    env::set_var(ROOT_FOLDER_ENV, "/tmp/primary");
    env::set_var(LEGACY_ROOT_ENV, "/tmp/legacy");
    let dir = TempDir::new().unwrap();

    assert_eq!(isolated_resolver(&dir).resolve(), PathBuf::from("/tmp/primary"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_empty_env_var_is_ignored() {
    clear_root_env();
    env::set_var(ROOT_FOLDER_ENV, "");
    env::set_var(LEGACY_ROOT_ENV, "/tmp/legacy-only");
    let dir = TempDir::new().unwrap();

    assert_eq!(isolated_resolver(&dir).resolve(), PathBuf::from("/tmp/legacy-only"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_reads_config_file() {
    clear_root_env();
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, "root_folder = \"/srv/wspm\"\nport = 5999\n").unwrap();

    let resolver = RootFolderResolver::new("wspm-pe").with_config_path(config_path);
    assert_eq!(resolver.resolve(), PathBuf::from("/srv/wspm"));
    assert_eq!(resolver.load_config().port, Some(5999));
}

#[test]
#[serial]
fn test_resolver_malformed_config_falls_back_to_defaults() {
    clear_root_env();
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, "root_folder = [this is not toml").unwrap();

    let resolver = RootFolderResolver::new("wspm-pe").with_config_path(config_path);
    assert_eq!(resolver.load_config(), TomlConfig::default());
    assert_eq!(
        resolver.resolve(),
        CompiledDefaults::for_current_platform().root_folder
    );
}

#[test]
fn test_initializer_database_path() {
    let initializer = RootFolderInitializer::new(PathBuf::from("/tmp/wspm"));
    assert_eq!(
        initializer.database_path(),
        PathBuf::from("/tmp/wspm").join(DATABASE_FILE)
    );
}

#[test]
fn test_initializer_creates_nested_directory() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("a").join("b").join("c");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();
    assert!(root.is_dir());

    // Second call is a no-op
    initializer.ensure_directory_exists().unwrap();
    assert_eq!(initializer.root_folder(), root.as_path());
}

#[test]
fn test_missing_fields_use_defaults() {
    let parsed: TomlConfig = toml::from_str("root_folder = \"/data\"").unwrap();

    assert_eq!(parsed.root_folder, Some(PathBuf::from("/data")));
    assert_eq!(parsed.port, None);
    assert_eq!(parsed.logging, LoggingConfig::default());
}

#[test]
fn test_logging_section() {
    let parsed: TomlConfig = toml::from_str(
        r#"
        [logging]
        level = "debug"
        log_file = "/var/log/wspm.log"
        "#,
    )
    .unwrap();

    assert_eq!(parsed.logging.level, "debug");
    assert_eq!(parsed.logging.log_file, Some(PathBuf::from("/var/log/wspm.log")));
    assert!(parsed.root_folder.is_none());
}
