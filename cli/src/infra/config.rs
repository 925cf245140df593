//! Infrastructure implementation of the `ConfigStore` port.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::application::ports::ConfigStore;
use crate::domain::config::{BootConfig, EnvOverrides};

/// Prefix of the environment variables that override file settings.
pub const ENV_PREFIX: &str = "CHEFBOOT_";

/// Production implementation of `ConfigStore` that uses a YAML file on disk.
pub struct YamlConfigStore;

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<BootConfig> {
        let path = self.path()?;
        if !path.exists() {
            return Ok(BootConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    fn save(&self, config: &BootConfig) -> Result<()> {
        let path = self.path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(config).context("cannot serialize config")?;
        std::fs::write(&path, content)
            .with_context(|| format!("cannot write {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("cannot set permissions on {}", path.display()))?;
        }
        Ok(())
    }

    fn path(&self) -> Result<PathBuf> {
        if let Ok(val) = std::env::var("CHEFBOOT_CONFIG") {
            return Ok(PathBuf::from(val));
        }
        Ok(chefboot_dir()?.join("config.yaml"))
    }
}

/// `~/.chefboot`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn chefboot_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.join(".chefboot"))
}

/// Read `CHEFBOOT_SERVER_URL`, `CHEFBOOT_VALIDATOR_NAME`,
/// `CHEFBOOT_VALIDATOR_KEY_PATH` and `CHEFBOOT_INVENTORY_PATH`.
///
/// # Errors
///
/// Returns an error if a set variable cannot be decoded.
pub fn env_overrides() -> Result<EnvOverrides> {
    envy::prefixed(ENV_PREFIX)
        .from_env()
        .context("failed to read CHEFBOOT_* environment overrides")
}

/// File settings with environment overrides applied.
///
/// # Errors
///
/// Returns an error if the file or the environment cannot be read.
pub fn effective_config(store: &impl ConfigStore) -> Result<BootConfig> {
    Ok(store.load()?.with_overrides(env_overrides()?))
}
