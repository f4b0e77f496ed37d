//! Hands execution requests to the backend and shares the result.

use std::sync::Arc;

use coderoom_core::{EXECUTION_FAILED, ExecutionBackend, ExecutionRequest, Language};
use tracing::{debug, info, warn};

use crate::{Broadcaster, SessionRegistry};

/// What happened to an execution request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The room had no members; nothing was run or sent.
    Dropped,
    /// The backend answered and its output was shared.
    Completed,
    /// The request could not be run; the failure marker was shared.
    Failed,
}

/// Runs code for a room and broadcasts the normalized output.
pub struct ExecutionDispatcher<E> {
    backend: E,
    registry: Arc<SessionRegistry>,
    broadcaster: Arc<Broadcaster>,
}

impl<E: ExecutionBackend> ExecutionDispatcher<E> {
    /// Create a dispatcher over a shared registry and broadcaster.
    #[must_use]
    pub const fn new(
        backend: E,
        registry: Arc<SessionRegistry>,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        Self {
            backend,
            registry,
            broadcaster,
        }
    }

    /// Run `source_code` as `language_tag` on behalf of `room`.
    ///
    /// Requests for rooms without members are dropped silently. Unsupported
    /// languages and backend errors are reported to the room as
    /// [`EXECUTION_FAILED`], never to the caller. The result goes to whoever
    /// is in the room when it arrives.
    pub async fn dispatch(
        &self,
        room: &str,
        source_code: String,
        language_tag: &str,
    ) -> DispatchOutcome {
        if !self.registry.contains(room) {
            debug!(room, "Dropping execution for empty room");
            return DispatchOutcome::Dropped;
        }

        let language = match language_tag.parse::<Language>() {
            Ok(language) => language,
            Err(e) => {
                debug!(room, "Rejecting execution: {e}");
                self.broadcaster.code_response(room, EXECUTION_FAILED);
                return DispatchOutcome::Failed;
            }
        };

        let request = ExecutionRequest {
            source_code,
            language,
        };

        match self.backend.execute(&request).await {
            Ok(output) => {
                let delivered = self.broadcaster.code_response(room, output.display_text());
                info!(room, %language, delivered, "Execution finished");
                DispatchOutcome::Completed
            }
            Err(e) => {
                warn!(room, %language, "Execution error: {e}");
                self.broadcaster.code_response(room, EXECUTION_FAILED);
                DispatchOutcome::Failed
            }
        }
    }
}
