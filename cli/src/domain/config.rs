//! Domain types and validators for chefboot configuration.
//!
//! Pure functions only. No I/O or async.

use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::Result;
use chefboot_common::{CachePolicy, FailurePolicy, Retention};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::client_rb::{ClientSettings, LogLevel};
use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "server.url",
    "validator.name",
    "validator.key_path",
    "inventory.path",
    "agent.version",
    "client.log_level",
    "client.environment",
    "cache.retention",
    "cache.failures",
    "lookup.timeout_secs",
];

pub const DEFAULT_SERVER_URL: &str = "http://localhost:4000";
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 30;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("valid regex")
});

static AGENT_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^(latest|[0-9]+(\.[0-9]+){0,2})$").expect("valid regex")
});

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.chefboot/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BootConfig {
    pub server: ServerConfig,
    pub validator: ValidatorConfig,
    pub inventory: InventoryConfig,
    pub agent: AgentConfig,
    pub client: ClientConfig,
    pub cache: CachePolicy,
    pub lookup: LookupConfig,
}

/// Chef server the nodes register with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_url")]
    pub url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
        }
    }
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

/// Validator client; both fields are required before a script can be composed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ValidatorConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// PEM file holding the validator's private key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_path: Option<PathBuf>,
}

/// Where group run lists and clients are read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InventoryConfig {
    /// Defaults to `~/.chefboot/inventory.yaml` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// chef-client version passed to the installer.
    #[serde(default = "default_agent_version")]
    pub version: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            version: default_agent_version(),
        }
    }
}

fn default_agent_version() -> String {
    "latest".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

impl ClientConfig {
    #[must_use]
    pub fn settings(&self) -> ClientSettings {
        ClientSettings {
            log_level: self.log_level,
            environment: self.environment.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Upper bound for one backing lookup of a group.
    #[serde(default = "default_lookup_timeout")]
    pub timeout_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_LOOKUP_TIMEOUT_SECS,
        }
    }
}

fn default_lookup_timeout() -> u64 {
    DEFAULT_LOOKUP_TIMEOUT_SECS
}

/// Values taken from `CHEFBOOT_*` environment variables; each one, when set,
/// wins over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EnvOverrides {
    pub server_url: Option<String>,
    pub validator_name: Option<String>,
    pub validator_key_path: Option<PathBuf>,
    pub inventory_path: Option<PathBuf>,
}

impl BootConfig {
    /// Apply environment overrides on top of file values.
    #[must_use]
    pub fn with_overrides(mut self, overrides: EnvOverrides) -> Self {
        if let Some(url) = overrides.server_url {
            self.server.url = url;
        }
        if let Some(name) = overrides.validator_name {
            self.validator.name = Some(name);
        }
        if let Some(path) = overrides.validator_key_path {
            self.validator.key_path = Some(path);
        }
        if let Some(path) = overrides.inventory_path {
            self.inventory.path = Some(path);
        }
        self
    }

    /// Set `key` to `value` after validating both.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is invalid for it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        match key {
            "server.url" => self.server.url = value.to_string(),
            "validator.name" => self.validator.name = Some(value.to_string()),
            "validator.key_path" => self.validator.key_path = Some(PathBuf::from(value)),
            "inventory.path" => self.inventory.path = Some(PathBuf::from(value)),
            "agent.version" => self.agent.version = value.to_string(),
            "client.log_level" => self.client.log_level = parse_log_level(key, value)?,
            "client.environment" => self.client.environment = Some(value.to_string()),
            "cache.retention" => self.cache.retention = parse_retention(key, value)?,
            "cache.failures" => self.cache.failures = parse_failures(key, value)?,
            "lookup.timeout_secs" => self.lookup.timeout_secs = parse_timeout(key, value)?,
            _ => anyhow::bail!("Unknown setting: {key}"),
        }
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    match key {
        "server.url" => {
            if !(value.starts_with("http://") || value.starts_with("https://"))
                || value.len() <= "https://".len()
                || value.chars().any(char::is_whitespace)
            {
                return Err(invalid(key, value, "an http:// or https:// URL"));
            }
        }
        "validator.name" => {
            if !NAME_RE.is_match(value) {
                return Err(invalid(key, value, "letters, digits, '.', '_' or '-'"));
            }
        }
        "client.environment" => {
            if !NAME_RE.is_match(value) {
                return Err(invalid(key, value, "letters, digits, '.', '_' or '-'"));
            }
        }
        "validator.key_path" | "inventory.path" => {
            if value.trim().is_empty() {
                return Err(invalid(key, value, "a file path"));
            }
        }
        "agent.version" => {
            if !AGENT_VERSION_RE.is_match(value) {
                return Err(invalid(key, value, "latest, or a version such as 18.2.7"));
            }
        }
        "client.log_level" => {
            parse_log_level(key, value)?;
        }
        "cache.retention" => {
            parse_retention(key, value)?;
        }
        "cache.failures" => {
            parse_failures(key, value)?;
        }
        "lookup.timeout_secs" => {
            parse_timeout(key, value)?;
        }
        _ => {}
    }
    Ok(())
}

fn invalid(key: &str, value: &str, valid: &str) -> anyhow::Error {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        valid: valid.to_string(),
    }
    .into()
}

fn parse_log_level(key: &str, value: &str) -> Result<LogLevel> {
    value
        .parse()
        .map_err(|()| invalid(key, value, &LogLevel::ALL.join(", ")))
}

fn parse_retention(key: &str, value: &str) -> Result<Retention> {
    value
        .parse()
        .map_err(|_| invalid(key, value, "unbounded, or a positive entry count"))
}

fn parse_failures(key: &str, value: &str) -> Result<FailurePolicy> {
    value.parse().map_err(|_| invalid(key, value, "retry, cache"))
}

fn parse_timeout(key: &str, value: &str) -> Result<u64> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(invalid(key, value, "a positive number of seconds")),
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
