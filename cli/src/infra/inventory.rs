//! YAML inventory file: implements `RunListSource` and `ClientSource`.
//!
//! ```yaml
//! groups:
//!   web:
//!     run_list: ["recipe[apache2]"]
//!     clients: ["web-1"]
//! ```
//!
//! The file is re-read on every lookup; the group caches in front of it make
//! sure that happens at most once per group.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chefboot_common::{Group, RunList};
use serde::Deserialize;

use crate::application::ports::{ClientSource, RunListSource};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Inventory {
    groups: BTreeMap<Group, GroupEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GroupEntry {
    run_list: Option<RunList>,
    clients: Vec<String>,
}

/// Inventory backed by a YAML file on disk.
#[derive(Debug, Clone)]
pub struct InventoryFile {
    path: PathBuf,
}

impl InventoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Inventory> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("cannot read inventory {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(Inventory::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse inventory {}", self.path.display()))
    }
}

impl RunListSource for InventoryFile {
    async fn run_list_for_group(&self, group: &Group) -> Result<Option<RunList>> {
        let mut inventory = self.read().await?;
        let run_list = inventory
            .groups
            .remove(group)
            .and_then(|entry| entry.run_list);
        tracing::debug!(%group, found = run_list.is_some(), "read run list from inventory");
        Ok(run_list)
    }
}

impl ClientSource for InventoryFile {
    async fn clients_for_group(&self, group: &Group) -> Result<Vec<String>> {
        let mut inventory = self.read().await?;
        Ok(inventory
            .groups
            .remove(group)
            .map(|entry| entry.clients)
            .unwrap_or_default())
    }
}
