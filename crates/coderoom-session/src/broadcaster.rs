//! Room audiences and per-event fan-out.
//!
//! | Event          | Audience                 | Sent as          |
//! |----------------|--------------------------|------------------|
//! | membership     | everyone in the room     | `userJoined`     |
//! | code change    | everyone but the sender  | `codeUpdate`     |
//! | typing         | everyone but the sender  | `userTyping`     |
//! | language       | everyone in the room     | `languageUpdate` |
//! | execution      | everyone in the room     | `codeResponse`   |

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use coderoom_core::{ConnectionId, EventSender, RoomKey, ServerEvent};

type Audiences = HashMap<RoomKey, HashMap<ConnectionId, EventSender>>;

/// Tracks which connections listen to which room and delivers events to them.
///
/// Delivery goes through unbounded per-connection channels, so a slow peer
/// never stalls the sender. Channels whose receiver is gone are skipped.
#[derive(Default)]
pub struct Broadcaster {
    audiences: RwLock<Audiences>,
}

impl Broadcaster {
    /// Create a broadcaster with no audiences.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to the audience of `room`.
    pub fn join(&self, room: &str, id: ConnectionId, outbox: EventSender) {
        self.audiences
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(room.to_string())
            .or_default()
            .insert(id, outbox);
    }

    /// Remove a connection from the audience of `room`.
    pub fn leave(&self, room: &str, id: ConnectionId) {
        let mut audiences = self.audiences.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(audience) = audiences.get_mut(room) {
            audience.remove(&id);
            if audience.is_empty() {
                audiences.remove(room);
            }
        }
    }

    /// Number of connections listening to `room`.
    #[must_use]
    pub fn audience_size(&self, room: &str) -> usize {
        self.audiences
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(room)
            .map_or(0, HashMap::len)
    }

    /// Send `event` to every connection in `room` except `except`.
    ///
    /// Returns how many connections it was delivered to.
    fn send(&self, room: &str, except: Option<ConnectionId>, event: &ServerEvent) -> usize {
        let audiences = self.audiences.read().unwrap_or_else(PoisonError::into_inner);
        let Some(audience) = audiences.get(room) else {
            return 0;
        };
        audience
            .iter()
            .filter(|(id, _)| Some(**id) != except)
            .filter(|(_, outbox)| outbox.send(event.clone()).is_ok())
            .count()
    }

    /// Send the membership snapshot of `room` to everyone in it.
    pub fn membership(&self, room: &str, members: Vec<String>) -> usize {
        self.send(room, None, &ServerEvent::UserJoined(members))
    }

    /// Relay new source text to everyone in `room` but the author.
    pub fn code_update(&self, room: &str, from: ConnectionId, code: String) -> usize {
        self.send(room, Some(from), &ServerEvent::CodeUpdate(code))
    }

    /// Tell everyone in `room` but `from` that `name` is typing.
    pub fn typing(&self, room: &str, from: ConnectionId, name: String) -> usize {
        self.send(room, Some(from), &ServerEvent::UserTyping(name))
    }

    /// Announce the room's new language to everyone, the sender included.
    pub fn language_update(&self, room: &str, language: String) -> usize {
        self.send(room, None, &ServerEvent::LanguageUpdate(language))
    }

    /// Share an execution result with everyone currently in `room`.
    pub fn code_response(&self, room: &str, output: impl Into<String>) -> usize {
        self.send(room, None, &ServerEvent::code_response(output))
    }
}
