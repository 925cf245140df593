//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod bootstrap;
pub mod client_rb;
pub mod codec;
pub mod config;
pub mod error;
pub mod pem;
pub mod render;
pub mod statement;

pub use bootstrap::{BootPlan, ValidatorIdentity, install_chef_client, require_run_list};
pub use client_rb::{ClientSettings, LogLevel};
pub use codec::{Codec, CodecError, JsonCodec};
pub use config::{BootConfig, EnvOverrides, validate_config_key, validate_config_value};
pub use error::{BootstrapError, ComposeError, ConfigError, LookupError, RenderError};
pub use pem::{KeyFormat, PrivateKey};
pub use render::{RenderedScript, Renderer};
pub use statement::{Script, Statement};
