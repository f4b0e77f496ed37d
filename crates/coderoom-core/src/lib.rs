//! Core types for collaborative code rooms.
//!
//! This crate provides the shared vocabulary:
//! - `ClientEvent` / `ServerEvent` - what a connection sends and receives
//! - `Language` - languages the room can execute
//! - `ExecutionBackend` - trait for the remote code runner

pub mod event;
pub mod language;
pub mod traits;

pub use event::{ClientEvent, EventSender, RunOutput, ServerEvent};
pub use language::{Language, LanguageError};
pub use traits::{
    ConnectionId, EXECUTION_FAILED, ExecutionBackend, ExecutionError, ExecutionOutput,
    ExecutionRequest, NO_OUTPUT, RoomKey,
};
