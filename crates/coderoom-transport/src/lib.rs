//! Wire protocol and WebSocket transport for collaborative code rooms.
//!
//! Provides:
//! - Wire protocol (JSON, adjacently tagged events)
//! - WebSocket transport (feature: websocket)

pub mod protocol;

#[cfg(feature = "websocket")]
pub mod websocket;

pub use protocol::{ProtocolError, decode, encode};

#[cfg(feature = "websocket")]
pub use websocket::create_ws_router;
