//! JSON output helpers.
//!
//! Every `--json` code path prints exactly one pretty-printed JSON document
//! to stdout, including failures, which use the error object below.

use std::path::Path;

use anyhow::{Context, Result};
use chefboot_common::ClientIdentity;
use serde::Serialize;

use crate::domain::config::BootConfig;
use crate::domain::error::ComposeError;
use crate::output::ScriptReport;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Stable code for `err`: the composition failure kind when there is one,
/// `error` otherwise.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<ComposeError>()
        .map_or("error", ComposeError::code)
}

/// Renders command results as JSON documents on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_scripts(&self, scripts: &[ScriptReport]) -> Result<()> {
        print_json(&serde_json::json!({ "scripts": scripts }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_clients(&self, clients: &[ClientIdentity]) -> Result<()> {
        print_json(&serde_json::json!({ "clients": clients }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_config(&self, config: &BootConfig, path: &Path) -> Result<()> {
        print_json(&serde_json::json!({
            "path": path,
            "config": config,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_config_set(&self, key: &str, value: &str) -> Result<()> {
        print_json(&serde_json::json!({ "key": key, "value": value }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        print_json(&serde_json::json!({ "version": version }))
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{text}");
    Ok(())
}
