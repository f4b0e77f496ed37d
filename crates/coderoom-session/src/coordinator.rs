//! Room coordinator wiring registry, audiences and execution together.

use std::sync::Arc;

use coderoom_core::{EventSender, ExecutionBackend};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{
    Broadcaster, ConnectionSession, DispatchOutcome, ExecutionDispatcher, SessionRegistry,
};

/// Shared handle to everything a connection needs to take part in rooms.
///
/// Cheap to clone; every clone refers to the same registry and audiences.
pub struct RoomCoordinator<E> {
    registry: Arc<SessionRegistry>,
    broadcaster: Arc<Broadcaster>,
    dispatcher: Arc<ExecutionDispatcher<E>>,
}

impl<E> Clone for RoomCoordinator<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            broadcaster: Arc::clone(&self.broadcaster),
            dispatcher: Arc::clone(&self.dispatcher),
        }
    }
}

impl<E: ExecutionBackend + 'static> RoomCoordinator<E> {
    /// Create a coordinator with a fresh, pruning registry.
    #[must_use]
    pub fn new(backend: E) -> Self {
        Self::with_registry(Arc::new(SessionRegistry::new()), backend)
    }

    /// Create a coordinator over an existing registry.
    #[must_use]
    pub fn with_registry(registry: Arc<SessionRegistry>, backend: E) -> Self {
        let broadcaster = Arc::new(Broadcaster::new());
        let dispatcher = Arc::new(ExecutionDispatcher::new(
            backend,
            Arc::clone(&registry),
            Arc::clone(&broadcaster),
        ));
        Self {
            registry,
            broadcaster,
            dispatcher,
        }
    }

    /// Register a new connection whose outbound events go to `outbox`.
    #[must_use]
    pub fn connect(&self, outbox: EventSender) -> ConnectionSession<E> {
        ConnectionSession::new(Uuid::new_v4(), outbox, self.clone())
    }

    #[must_use]
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    #[must_use]
    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Run code for `room` in the background.
    ///
    /// The caller's event loop is not blocked; the result is broadcast to the
    /// room when it arrives.
    pub fn execute(
        &self,
        room: &str,
        code: String,
        language: String,
    ) -> JoinHandle<DispatchOutcome> {
        let dispatcher = Arc::clone(&self.dispatcher);
        let room = room.to_string();
        tokio::spawn(async move { dispatcher.dispatch(&room, code, &language).await })
    }
}
