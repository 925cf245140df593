//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chefboot_common::{Group, RunList};

use crate::domain::config::BootConfig;
use crate::domain::pem::PrivateKey;

// ── Lookup Source Ports ───────────────────────────────────────────────────────

/// Backing store of run lists, keyed by group.
#[allow(async_fn_in_trait)]
pub trait RunListSource {
    /// Fetch the run list recorded for `group`.
    ///
    /// `Ok(None)` means the store answered and has no run list for the group;
    /// `Err` means the store could not be asked.
    async fn run_list_for_group(&self, group: &Group) -> Result<Option<RunList>>;
}

/// Backing store of client names already registered for a group.
#[allow(async_fn_in_trait)]
pub trait ClientSource {
    /// Client names on record for `group`, in registration order.
    async fn clients_for_group(&self, group: &Group) -> Result<Vec<String>>;
}

// ── Credential Port ───────────────────────────────────────────────────────────

/// Reads validator private keys.
#[allow(async_fn_in_trait)]
pub trait ValidatorKeyLoader {
    /// Load and decode the first private key in the file at `path`.
    async fn load(&self, path: &Path) -> Result<PrivateKey>;
}

// ── Configuration Port ────────────────────────────────────────────────────────

/// Abstracts configuration persistence.
pub trait ConfigStore {
    /// Load configuration, returning defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<BootConfig>;
    /// Persist configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn save(&self, config: &BootConfig) -> Result<()>;
    /// Location of the backing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be determined.
    fn path(&self) -> Result<PathBuf>;
}

// ── Output Port ───────────────────────────────────────────────────────────────

/// Writes rendered scripts to the local filesystem.
#[allow(async_fn_in_trait)]
pub trait ScriptWriter {
    /// Whether something already exists at `path`.
    async fn exists(&self, path: &Path) -> bool;
    /// Create or replace `path` with `text`, readable by the owner only.
    async fn write_script(&self, path: &Path, text: &str) -> Result<()>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
