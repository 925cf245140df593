use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How long computed group entries stay in a lookup cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RetentionRepr", into = "RetentionRepr")]
pub enum Retention {
    /// Entries live as long as the cache. Group names are a small, stable
    /// key space for the lifetime of a process.
    #[default]
    Unbounded,
    /// Keep at most this many entries; the oldest inserted entry goes first.
    Capacity(NonZeroUsize),
}

/// What a lookup cache does with a failed computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Callers already waiting on the failed computation share its error;
    /// the next lookup recomputes.
    #[default]
    Retry,
    /// The failure is kept and returned to every later lookup of the key.
    Cache,
}

/// Retention and failure behaviour for one lookup cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CachePolicy {
    pub retention: Retention,
    pub failures: FailurePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid cache {field} '{value}': expected {expected}")]
pub struct InvalidCachePolicy {
    pub field: &'static str,
    pub value: String,
    pub expected: &'static str,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RetentionRepr {
    Capacity(usize),
    Name(String),
}

impl TryFrom<RetentionRepr> for Retention {
    type Error = InvalidCachePolicy;

    fn try_from(repr: RetentionRepr) -> Result<Self, Self::Error> {
        match repr {
            RetentionRepr::Capacity(n) => NonZeroUsize::new(n)
                .map(Retention::Capacity)
                .ok_or_else(|| retention_error("0")),
            RetentionRepr::Name(name) => name.parse(),
        }
    }
}

impl From<Retention> for RetentionRepr {
    fn from(retention: Retention) -> Self {
        match retention {
            Retention::Unbounded => RetentionRepr::Name("unbounded".to_string()),
            Retention::Capacity(n) => RetentionRepr::Capacity(n.get()),
        }
    }
}

fn retention_error(value: &str) -> InvalidCachePolicy {
    InvalidCachePolicy {
        field: "retention",
        value: value.to_string(),
        expected: "'unbounded' or a positive entry count",
    }
}

impl FromStr for Retention {
    type Err = InvalidCachePolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "unbounded" {
            return Ok(Self::Unbounded);
        }
        s.parse::<NonZeroUsize>()
            .map(Self::Capacity)
            .map_err(|_| retention_error(s))
    }
}

impl fmt::Display for Retention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => f.write_str("unbounded"),
            Self::Capacity(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = InvalidCachePolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "retry" => Ok(Self::Retry),
            "cache" => Ok(Self::Cache),
            _ => Err(InvalidCachePolicy {
                field: "failures",
                value: s.to_string(),
                expected: "'retry' or 'cache'",
            }),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retry => f.write_str("retry"),
            Self::Cache => f.write_str("cache"),
        }
    }
}
