//! Events exchanged between a connection and its room.
//!
//! Both enums are adjacently tagged: `{"event": "<name>", "data": <payload>}`.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::RoomKey;

/// Outbound half of a connection; everything a room sends goes through here.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Event received from a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Bind this connection to a room under a display name.
    Join {
        #[serde(rename = "roomId")]
        room: RoomKey,
        #[serde(rename = "userName")]
        name: String,
    },
    /// Replace the shared source text.
    CodeChange {
        #[serde(rename = "roomId", default)]
        room: Option<RoomKey>,
        code: String,
    },
    /// The sender is typing. The broadcast name is always the bound one.
    Typing {
        #[serde(rename = "roomId", default)]
        room: Option<RoomKey>,
        #[serde(rename = "userName", default)]
        name: Option<String>,
    },
    /// Switch the room's language.
    LanguageChange {
        #[serde(rename = "roomId", default)]
        room: Option<RoomKey>,
        language: String,
    },
    /// Run the given source and share the output with the room.
    CompileCode {
        #[serde(rename = "roomId", default)]
        room: Option<RoomKey>,
        code: String,
        language: String,
    },
    /// Leave the current room, if any.
    LeaveRoom,
    /// Keepalive.
    Ping,
}

impl ClientEvent {
    /// Room key carried by the event itself, if any.
    #[must_use]
    pub fn room_hint(&self) -> Option<&str> {
        match self {
            Self::Join { room, .. } => Some(room),
            Self::CodeChange { room, .. }
            | Self::Typing { room, .. }
            | Self::LanguageChange { room, .. }
            | Self::CompileCode { room, .. } => room.as_deref(),
            Self::LeaveRoom | Self::Ping => None,
        }
    }

    /// Wire name of the event, for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::CodeChange { .. } => "codeChange",
            Self::Typing { .. } => "typing",
            Self::LanguageChange { .. } => "languageChange",
            Self::CompileCode { .. } => "compileCode",
            Self::LeaveRoom => "leaveRoom",
            Self::Ping => "ping",
        }
    }
}

/// Output of an execution as shown to the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutput {
    pub output: String,
}

/// Event delivered to a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Current membership snapshot of the room.
    UserJoined(Vec<String>),
    /// Source text from another participant.
    CodeUpdate(String),
    /// Display name of a participant who is typing.
    UserTyping(String),
    /// New language of the room.
    LanguageUpdate(String),
    /// Result of an execution request.
    CodeResponse { run: RunOutput },
    /// Keepalive reply.
    Pong,
    /// The connection sent something the server could not use.
    Error { message: String },
}

impl ServerEvent {
    /// Build a `codeResponse` carrying `output`.
    #[must_use]
    pub fn code_response(output: impl Into<String>) -> Self {
        Self::CodeResponse {
            run: RunOutput {
                output: output.into(),
            },
        }
    }
}
