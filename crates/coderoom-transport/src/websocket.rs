//! WebSocket transport for code rooms.

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
    routing::get,
};
use coderoom_core::{ExecutionBackend, ServerEvent};
use coderoom_session::RoomCoordinator;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::protocol;

/// WebSocket upgrade handler.
///
/// Use this as an Axum route handler with a [`RoomCoordinator`] as state.
pub async fn ws_handler<E>(
    ws: WebSocketUpgrade,
    State(rooms): State<RoomCoordinator<E>>,
) -> impl IntoResponse
where
    E: ExecutionBackend + 'static,
{
    ws.on_upgrade(|socket| handle_socket(socket, rooms))
}

/// Drive one connection until the peer goes away.
///
/// Frames are handled one at a time in arrival order. Outbound events are
/// queued on a channel and written by a separate task.
async fn handle_socket<E>(socket: WebSocket, rooms: RoomCoordinator<E>)
where
    E: ExecutionBackend + 'static,
{
    let (mut sender, mut receiver) = socket.split();

    // Channel for sending events to the client
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    let mut session = rooms.connect(tx);
    let conn = session.id();
    tracing::info!(conn = %conn, "Client connected");

    // Spawn task to forward events to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match protocol::encode(&event) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!("Failed to serialize event: {e}");
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = receiver.next().await {
        let decoded = match msg {
            Ok(Message::Text(text)) => protocol::decode(&text),
            Ok(Message::Binary(data)) => protocol::decode_binary(&data),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::error!(conn = %conn, "WebSocket error: {e}");
                break;
            }
        };

        match decoded {
            Ok(event) => session.handle(event),
            Err(e) => {
                tracing::warn!(conn = %conn, "Invalid client message: {e}");
                session.reply(ServerEvent::Error {
                    message: e.to_string(),
                });
            }
        }
    }

    session.disconnect();
    send_task.abort();
    tracing::info!(conn = %conn, "Client disconnected");
}

/// Create WebSocket router.
///
/// # Example
/// ```ignore
/// let app = Router::new()
///     .merge(create_ws_router(RoomCoordinator::new(backend)));
/// ```
#[must_use]
pub fn create_ws_router<E>(rooms: RoomCoordinator<E>) -> Router
where
    E: ExecutionBackend + 'static,
{
    Router::new()
        .route("/ws", get(ws_handler::<E>))
        .with_state(rooms)
}
