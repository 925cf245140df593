use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Logical identifier for a set of nodes sharing one configuration.
///
/// Opaque: only equality and hashing are meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Group(String);

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Group {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Group {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Ordered recipe/role references applied to a node, e.g. `recipe[apache2]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunList(Vec<String>);

impl RunList {
    #[must_use]
    pub fn new(entries: Vec<String>) -> Self {
        Self(entries)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for RunList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Client registered with the Chef server on behalf of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientIdentity {
    /// Client name, e.g. `web-1`.
    pub name: String,
    /// Group the client was resolved for.
    pub group: Group,
    /// `false` when the name was derived because the group had no client on record.
    pub registered: bool,
}

/// Target shell dialect a boot script is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    /// POSIX shell.
    Unix,
    /// Windows batch (`cmd.exe`).
    Windows,
}

impl OsFamily {
    /// File extension conventionally used for scripts of this family.
    #[must_use]
    pub fn script_extension(self) -> &'static str {
        match self {
            Self::Unix => "sh",
            Self::Windows => "cmd",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unix => "unix",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when an OS family name has no renderer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported OS family '{0}' (supported: unix, windows)")]
pub struct UnsupportedOsFamily(pub String);

impl FromStr for OsFamily {
    type Err = UnsupportedOsFamily;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unix" | "posix" | "linux" => Ok(Self::Unix),
            "windows" | "win" => Ok(Self::Windows),
            _ => Err(UnsupportedOsFamily(s.to_string())),
        }
    }
}
