//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use chefboot_common::{Group, OsFamily, UnsupportedOsFamily};
use thiserror::Error;

use crate::domain::codec::CodecError;

// ── Bootstrap request errors ──────────────────────────────────────────────────

/// A caller-fixable precondition for script generation is not met.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BootstrapError {
    #[error("validator name must be configured. Run 'chefboot config set validator.name <name>'.")]
    MissingValidatorName,

    #[error(
        "validator credential must be configured. Run 'chefboot config set validator.key_path <path>'."
    )]
    MissingValidatorCredential,

    #[error("run list for group '{group}' not found")]
    MissingRunList { group: Group },

    #[error("run list for group '{group}' is empty")]
    EmptyRunList { group: Group },
}

// ── Lookup errors ─────────────────────────────────────────────────────────────

/// A backing lookup for a group failed. Cloned to every caller that waited
/// on the same computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lookup for group '{group}' failed: {message}")]
pub struct LookupError {
    pub group: Group,
    pub message: String,
}

impl LookupError {
    pub fn new(group: &Group, cause: &anyhow::Error) -> Self {
        Self {
            group: group.clone(),
            message: format!("{cause:#}"),
        }
    }
}

// ── Render errors ─────────────────────────────────────────────────────────────

/// A statement sequence cannot be turned into script text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error(transparent)]
    UnsupportedFamily(#[from] UnsupportedOsFamily),

    #[error("{statement} has no {family} form")]
    UnsupportedStatement {
        statement: String,
        family: OsFamily,
    },

    #[error("cannot render {statement} for {family}: {reason}")]
    Unrenderable {
        statement: String,
        family: OsFamily,
        reason: String,
    },

    #[error(transparent)]
    Encoding(#[from] CodecError),
}

// ── Compose errors ────────────────────────────────────────────────────────────

/// Every way boot-script composition can fail. None of them yields a script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("invalid bootstrap request: {0}")]
    InvalidRequest(#[from] BootstrapError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("render failed: {0}")]
    Render(#[from] RenderError),
}

impl ComposeError {
    /// Stable machine-readable code used by `--json` error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::Lookup(_) => "lookup_failed",
            Self::Render(_) => "render_failed",
        }
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: String,
        value: String,
        valid: String,
    },
}
