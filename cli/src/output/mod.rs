//! Output formatting module
//!
//! Status lines (`success`, `warn`, `info`, `error`) go to stderr so that
//! script text written to stdout can be piped straight to a file.

pub mod human;
pub mod json;
pub mod progress;
pub mod reporter;
pub mod styles;

use std::path::{Path, PathBuf};

use anyhow::Result;
use chefboot_common::{ClientIdentity, Group, OsFamily};
use console::Term;
use owo_colors::OwoColorize as _;
use serde::Serialize;

use crate::domain::config::BootConfig;

pub use human::HumanRenderer;
pub use json::JsonRenderer;
pub use reporter::TerminalReporter;
pub use styles::Styles;

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stderr is a TTY.
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stderr().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();

        Self {
            styles: Styles::for_terminal(use_colors),
            is_tty,
            quiet,
        }
    }

    /// Check if progress indicators should be shown.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    /// Print a success message prefixed with `✓`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            eprintln!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// Print a warning message prefixed with `⚠`. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            eprintln!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// Print an error message prefixed with `✗`. Never suppressed.
    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", "✗".style(self.styles.error));
    }

    /// Print an info message prefixed with `ℹ`. Suppressed when `quiet`.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            eprintln!("  {} {msg}", "ℹ".style(self.styles.info));
        }
    }

    /// Print a section header to stdout.
    pub fn header(&self, msg: &str) {
        println!("  {}", msg.style(self.styles.header));
    }

    /// Print a key-value pair to stdout with the key dimmed.
    pub fn kv(&self, key: &str, value: &str) {
        println!("  {:<22} {value}", key.style(self.styles.dim));
    }
}

/// One composed script, as reported to the user.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptReport {
    pub group: Group,
    pub os: OsFamily,
    /// Hex SHA-256 of the script text.
    pub sha256: String,
    /// Where the script was written, when it was written to a file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Script text, when it is printed rather than written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
}

/// Renderer for the active output mode.
pub enum OutputRenderer<'a> {
    Human(HumanRenderer<'a>),
    Json(JsonRenderer),
}

impl OutputRenderer<'_> {
    /// # Errors
    ///
    /// Returns an error if the scripts cannot be printed.
    pub fn render_scripts(&self, scripts: &[ScriptReport]) -> Result<()> {
        match self {
            Self::Human(r) => r.render_scripts(scripts),
            Self::Json(r) => r.render_scripts(scripts),
        }
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_clients(&self, clients: &[ClientIdentity]) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_clients(clients);
                Ok(())
            }
            Self::Json(r) => r.render_clients(clients),
        }
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_config(&self, config: &BootConfig, path: &Path) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_config(config, path);
                Ok(())
            }
            Self::Json(r) => r.render_config(config, path),
        }
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_config_set(&self, key: &str, value: &str) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_config_set(key, value);
                Ok(())
            }
            Self::Json(r) => r.render_config_set(key, value),
        }
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_version(version);
                Ok(())
            }
            Self::Json(r) => r.render_version(version),
        }
    }
}
