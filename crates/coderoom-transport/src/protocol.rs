//! Wire protocol for client-server communication.
//!
//! Every frame is one JSON object `{"event": "<name>", "data": <payload>}`;
//! see [`ClientEvent`] and [`ServerEvent`] for the payloads.

use coderoom_core::{ClientEvent, ServerEvent};
use thiserror::Error;

/// Frame that could not be turned into an event.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Invalid message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Binary frame is not valid UTF-8")]
    NotUtf8,
}

/// Decode a text frame.
///
/// # Errors
/// Returns error if the frame is not a known client event.
pub fn decode(text: &str) -> Result<ClientEvent, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}

/// Decode a binary frame carrying UTF-8 JSON.
///
/// # Errors
/// Returns error if the bytes are not UTF-8 or not a known client event.
pub fn decode_binary(data: &[u8]) -> Result<ClientEvent, ProtocolError> {
    let text = std::str::from_utf8(data).map_err(|_| ProtocolError::NotUtf8)?;
    decode(text)
}

/// Encode a server event as a text frame.
///
/// # Errors
/// Returns error if serialization fails.
pub fn encode(event: &ServerEvent) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(event)?)
}
