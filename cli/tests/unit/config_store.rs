//! Unit tests for the YAML config store and `CHEFBOOT_*` overrides.
//!
//! These tests mutate process environment variables, so each one is
//! `#[serial]`.

#![allow(clippy::expect_used, clippy::unwrap_used, unsafe_code)]

use std::path::PathBuf;

use chefboot_cli::application::ports::ConfigStore;
use chefboot_cli::application::services::config_service;
use chefboot_cli::domain::client_rb::LogLevel;
use chefboot_cli::infra::config::{YamlConfigStore, effective_config};
use chefboot_common::{FailurePolicy, Retention};
use serial_test::serial;
use tempfile::TempDir;

const OVERRIDES: &[&str] = &[
    "CHEFBOOT_SERVER_URL",
    "CHEFBOOT_VALIDATOR_NAME",
    "CHEFBOOT_VALIDATOR_KEY_PATH",
    "CHEFBOOT_INVENTORY_PATH",
];

/// Point the store at a fresh temp file and clear every override.
fn isolated() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.yaml");
    // SAFETY: every test touching the environment is #[serial].
    unsafe {
        std::env::set_var("CHEFBOOT_CONFIG", &path);
        for name in OVERRIDES {
            std::env::remove_var(name);
        }
    }
    (dir, path)
}

#[test]
#[serial]
fn missing_file_loads_defaults() {
    let (_dir, path) = isolated();

    assert_eq!(YamlConfigStore.path().unwrap(), path);
    let config = YamlConfigStore.load().unwrap();

    assert_eq!(config.server.url, "http://localhost:4000");
    assert_eq!(config.agent.version, "latest");
    assert_eq!(config.client.log_level, LogLevel::Info);
    assert_eq!(config.cache.retention, Retention::Unbounded);
    assert_eq!(config.cache.failures, FailurePolicy::Retry);
    assert_eq!(config.lookup.timeout_secs, 30);
    assert!(config.validator.name.is_none());
}

#[test]
#[serial]
fn set_value_persists_owner_only_yaml() {
    let (_dir, path) = isolated();

    config_service::set_value(&YamlConfigStore, "validator.name", "chef-validator").unwrap();
    config_service::set_value(&YamlConfigStore, "cache.retention", "64").unwrap();
    config_service::set_value(&YamlConfigStore, "client.log_level", "warn").unwrap();

    let config = YamlConfigStore.load().unwrap();
    assert_eq!(config.validator.name.as_deref(), Some("chef-validator"));
    assert_eq!(config.cache.retention.to_string(), "64");
    assert_eq!(config.client.log_level, LogLevel::Warn);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}

#[test]
#[serial]
fn invalid_value_is_not_saved() {
    let (_dir, path) = isolated();

    let err = config_service::set_value(&YamlConfigStore, "lookup.timeout_secs", "0").unwrap_err();

    assert!(err.to_string().contains("Invalid value for lookup.timeout_secs"), "got: {err}");
    assert!(!path.exists());
}

#[test]
#[serial]
fn environment_overrides_file_values() {
    let (dir, _path) = isolated();
    config_service::set_value(&YamlConfigStore, "server.url", "https://chef.internal").unwrap();
    config_service::set_value(&YamlConfigStore, "validator.name", "from-file").unwrap();
    let key = dir.path().join("env.pem");

    // SAFETY: every test touching the environment is #[serial].
    unsafe {
        std::env::set_var("CHEFBOOT_VALIDATOR_NAME", "from-env");
        std::env::set_var("CHEFBOOT_VALIDATOR_KEY_PATH", &key);
    }
    let config = effective_config(&YamlConfigStore).unwrap();
    // SAFETY: see above.
    unsafe {
        for name in OVERRIDES {
            std::env::remove_var(name);
        }
    }

    assert_eq!(config.server.url, "https://chef.internal");
    assert_eq!(config.validator.name.as_deref(), Some("from-env"));
    assert_eq!(config.validator.key_path, Some(key));
}

#[test]
#[serial]
fn malformed_file_is_reported() {
    let (_dir, path) = isolated();
    std::fs::write(&path, "server: [not, a, map]\n").unwrap();

    let err = YamlConfigStore.load().unwrap_err();

    assert!(err.to_string().contains("cannot parse"), "got: {err}");
}
