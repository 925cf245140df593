//! `client.rb` generation: the chef-client configuration file.
//!
//! Pure functions only. Every user-supplied value is written as an escaped
//! Ruby double-quoted string so it cannot interpolate or break out.

use chefboot_common::Group;
use serde::{Deserialize, Serialize};

/// chef-client `log_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    pub const ALL: &[&str] = &["debug", "info", "warn", "error", "fatal"];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "fatal" => Ok(Self::Fatal),
            _ => Err(()),
        }
    }
}

/// Client settings that do not depend on the group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientSettings {
    pub log_level: LogLevel,
    /// Chef environment to join; the server default when `None`.
    pub environment: Option<String>,
}

/// Inputs for one `client.rb`.
#[derive(Debug, Clone, Copy)]
pub struct ClientRb<'a> {
    pub server_url: &'a str,
    pub validator_name: &'a str,
    pub group: &'a Group,
    pub settings: &'a ClientSettings,
}

impl ClientRb<'_> {
    /// File content as lines without terminators.
    ///
    /// The node name is the node's EC2 local hostname (falling back to its
    /// hostname) suffixed with the group. The validator key is read from the
    /// directory `client.rb` itself lives in.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            "require 'ohai'".to_string(),
            "o = Ohai::System.new".to_string(),
            "o.all_plugins".to_string(),
            format!(
                "node_name \"#{{(o[:ec2] && o[:ec2][:local_hostname]) || o[:hostname]}}-{}\"",
                escape_ruby(self.group.as_str())
            ),
            format!("log_level :{}", self.settings.log_level.as_str()),
            "log_location STDOUT".to_string(),
            format!("validation_client_name {}", ruby_string(self.validator_name)),
            "validation_key File.join(File.dirname(__FILE__), 'validation.pem')".to_string(),
            format!("chef_server_url {}", ruby_string(self.server_url)),
        ];
        if let Some(environment) = &self.settings.environment {
            lines.push(format!("environment {}", ruby_string(environment)));
        }
        lines
    }
}

fn ruby_string(value: &str) -> String {
    format!("\"{}\"", escape_ruby(value))
}

/// Escape for the inside of a Ruby double-quoted string.
fn escape_ruby(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str(r"\\"),
            '"' => escaped.push_str("\\\""),
            '#' => escaped.push_str("\\#"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
