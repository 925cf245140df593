//! Serialization of configuration objects into the text files the agent reads.

use serde::Serialize;
use thiserror::Error;

/// A value could not be serialized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot encode {what}: {message}")]
pub struct CodecError {
    pub what: &'static str,
    pub message: String,
}

/// Turns a serializable value into file content.
pub trait Codec {
    /// Encode `value`; `what` names the value in errors.
    fn encode<T: Serialize + ?Sized>(&self, what: &'static str, value: &T) -> Result<String, CodecError>;
}

/// Compact single-line JSON, as chef-client expects for `-j` attribute files.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, what: &'static str, value: &T) -> Result<String, CodecError> {
        serde_json::to_string(value).map_err(|e| CodecError {
            what,
            message: e.to_string(),
        })
    }
}
