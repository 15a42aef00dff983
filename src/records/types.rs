//! Core data types and error definitions for the message records.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Source label attached to messages posted through `POST /post`.
pub const ASSISTANT_SOURCE: &str = "Assistente";
/// Source label attached to messages posted through `POST /text`.
pub const USER_SOURCE: &str = "Usuário";

/// Structured view of one message log line.
///
/// A record is built once, either when a message is appended or when a stored line is parsed
/// back, and never mutated afterwards. A line that cannot be recovered yields
/// [`Record::default`], with every field empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Local time of the append, formatted as `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    /// Free-form label naming who produced the message.
    pub source: String,
    /// Message text, stored verbatim.
    pub message: String,
    /// Opaque image reference (usually a URL). `None` when the line carried no image.
    #[serde(
        rename = "image_url",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub image_reference: Option<String>,
}

impl Record {
    /// Build a record, collapsing an empty image reference into `None`.
    pub fn new(
        timestamp: impl Into<String>,
        source: impl Into<String>,
        message: impl Into<String>,
        image_reference: Option<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            source: source.into(),
            message: message.into(),
            image_reference: image_reference.filter(|value| !value.is_empty()),
        }
    }

    /// Whether every field is empty, i.e. the line could not be recovered.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Payload accepted for a message that may carry an image. Also the shape of the latest-message slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedMessage {
    /// Optional image reference; an empty string means no image.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image_url: String,
    /// Message text.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
}

/// Payload accepted for a text-only message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainMessage {
    /// Message text.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
}

/// Read an explicit JSON `null` as an empty string.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Failures raised by the file-backed stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be opened, read, written, or synced.
    #[error("I/O failure on {}: {source}", path.display())]
    Io {
        /// File the operation targeted.
        path: PathBuf,
        /// Underlying error reported by the platform.
        #[source]
        source: std::io::Error,
    },
    /// The payload could not be encoded as JSON.
    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors emitted by the record service, one variant per failing stage.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Overwriting the latest-message slot failed.
    #[error("Failed to save latest message: {0}")]
    SaveLatest(#[source] StoreError),
    /// Reading the latest-message slot failed.
    #[error("Failed to load latest message: {0}")]
    LoadLatest(#[source] StoreError),
    /// Appending a line to the message log failed.
    #[error("Failed to append to message log: {0}")]
    AppendLog(#[source] StoreError),
    /// Reading the message log failed.
    #[error("Failed to read message log: {0}")]
    ReadLog(#[source] StoreError),
}
