//! Room membership, connection binding and event fan-out.
//!
//! Provides:
//! - `SessionRegistry` - which names are in which room
//! - `Broadcaster` - which connections hear which room
//! - `ConnectionSession` - per-connection state machine
//! - `ExecutionDispatcher` - runs code and shares the result
//! - `RoomCoordinator` - wires the above for the transport

pub mod binding;
pub mod broadcaster;
pub mod coordinator;
pub mod dispatch;
pub mod registry;

pub use binding::{Binding, ConnectionSession};
pub use broadcaster::Broadcaster;
pub use coordinator::RoomCoordinator;
pub use dispatch::{DispatchOutcome, ExecutionDispatcher};
pub use registry::SessionRegistry;
