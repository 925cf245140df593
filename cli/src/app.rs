//! Application context: unified state passed to every command handler.
//!
//! Built once in `Cli::run()`. Adding a cross-cutting concern means one field
//! here rather than a new parameter on every command.

use std::path::PathBuf;

use anyhow::Result;

use crate::domain::config::BootConfig;
use crate::infra::config::{YamlConfigStore, chefboot_dir, effective_config};
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, OutputRenderer};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by `CI` / `CHEFBOOT_YES` env vars).
    pub yes: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Behaviour options.
    pub behaviour: BehaviourFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Configuration file store.
    pub config_store: YamlConfigStore,
    /// When `true`, skip interactive prompts and use defaults.
    ///
    /// Set when `--yes` / `-y` is passed, or when the `CI` or `CHEFBOOT_YES`
    /// environment variables are present.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        let ci_env = std::env::var("CI").is_ok() || std::env::var("CHEFBOOT_YES").is_ok();
        let non_interactive = flags.behaviour.yes || ci_env;

        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        Self {
            // JSON output is the whole of stdout; status lines would only be noise.
            output: OutputContext::new(flags.output.no_color, flags.output.quiet || flags.output.json),
            mode,
            config_store: YamlConfigStore,
            non_interactive,
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate renderer for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> OutputRenderer<'_> {
        match self.mode {
            OutputMode::Human => OutputRenderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => OutputRenderer::Json(JsonRenderer),
        }
    }

    /// Configuration file merged with `CHEFBOOT_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or the environment cannot be read.
    pub fn config(&self) -> Result<BootConfig> {
        effective_config(&self.config_store)
    }

    /// Inventory location: the configured path, or `~/.chefboot/inventory.yaml`.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is configured and the home directory is unknown.
    pub fn inventory_path(&self, config: &BootConfig) -> Result<PathBuf> {
        match &config.inventory.path {
            Some(path) => Ok(path.clone()),
            None => Ok(chefboot_dir()?.join("inventory.yaml")),
        }
    }

    /// Ask the user for confirmation.
    ///
    /// When `non_interactive` is `true` (CI, `--yes` flag, or `CHEFBOOT_YES` env),
    /// returns `default` immediately without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails (e.g. no TTY available).
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.non_interactive {
            return Ok(default);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }
}
