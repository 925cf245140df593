//! Human-readable terminal renderer.

use std::io::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chefboot_common::ClientIdentity;
use owo_colors::OwoColorize as _;

use crate::domain::config::BootConfig;
use crate::output::{OutputContext, ScriptReport};

/// Renders command results for a person at a terminal.
///
/// Script text is written to stdout untouched; everything else is
/// decoration around it.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Print inline scripts verbatim and list written ones.
    ///
    /// # Errors
    ///
    /// Returns an error if more than one script would be printed inline, or
    /// stdout cannot be written.
    pub fn render_scripts(&self, scripts: &[ScriptReport]) -> Result<()> {
        let inline = scripts.iter().filter(|s| s.script.is_some()).count();
        if inline > 1 {
            anyhow::bail!(
                "{inline} scripts cannot share stdout; pass --out-dir to write one file per group"
            );
        }

        for report in scripts {
            if let Some(text) = &report.script {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(text.as_bytes())
                    .and_then(|()| stdout.flush())
                    .context("failed to write script to stdout")?;
            }
            if let Some(path) = &report.path {
                self.ctx.success(&format!(
                    "{} → {} ({}, sha256 {})",
                    report.group,
                    path.display().style(self.ctx.styles.path),
                    report.os,
                    short_digest(&report.sha256).style(self.ctx.styles.digest)
                ));
            }
        }
        Ok(())
    }

    pub fn render_clients(&self, clients: &[ClientIdentity]) {
        for client in clients {
            let state = if client.registered {
                "registered".style(self.ctx.styles.success).to_string()
            } else {
                "derived".style(self.ctx.styles.warning).to_string()
            };
            self.ctx
                .kv(&format!("{}:", client.group), &format!("{} ({state})", client.name));
        }
    }

    pub fn render_config(&self, config: &BootConfig, path: &Path) {
        println!();
        self.ctx
            .header(&format!("Configuration ({})", path.display()));
        println!();
        let unset = || "(not set)".to_string();
        self.ctx.kv("server.url:", &config.server.url);
        self.ctx.kv(
            "validator.name:",
            &config.validator.name.clone().unwrap_or_else(unset),
        );
        self.ctx.kv(
            "validator.key_path:",
            &config
                .validator
                .key_path
                .as_ref()
                .map_or_else(unset, |p| p.display().to_string()),
        );
        self.ctx.kv(
            "inventory.path:",
            &config
                .inventory
                .path
                .as_ref()
                .map_or_else(|| "(default)".to_string(), |p| p.display().to_string()),
        );
        self.ctx.kv("agent.version:", &config.agent.version);
        self.ctx.kv("client.log_level:", config.client.log_level.as_str());
        self.ctx.kv(
            "client.environment:",
            &config.client.environment.clone().unwrap_or_else(unset),
        );
        self.ctx.kv("cache.retention:", &config.cache.retention.to_string());
        self.ctx.kv("cache.failures:", &config.cache.failures.to_string());
        self.ctx
            .kv("lookup.timeout_secs:", &config.lookup.timeout_secs.to_string());
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in [
            "CHEFBOOT_CONFIG",
            "CHEFBOOT_SERVER_URL",
            "CHEFBOOT_VALIDATOR_NAME",
            "CHEFBOOT_VALIDATOR_KEY_PATH",
            "CHEFBOOT_INVENTORY_PATH",
            "CHEFBOOT_LOG",
        ] {
            println!(
                "    {:<28} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| "(not set)".to_string())
            );
        }
        println!();
    }

    pub fn render_config_set(&self, key: &str, value: &str) {
        self.ctx.success(&format!("Set {key} = {value}"));
    }

    pub fn render_version(&self, version: &str) {
        println!("chefboot {version}");
    }
}

fn short_digest(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}
