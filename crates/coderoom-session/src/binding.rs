//! Per-connection room binding.
//!
//! A connection is either `Unbound` or bound to exactly one `(room, name)`
//! pair. Joining while bound leaves the old room first, so switching rooms is
//! just another join.

use coderoom_core::{
    ClientEvent, ConnectionId, EventSender, ExecutionBackend, RoomKey, ServerEvent,
};
use tracing::{debug, info};

use crate::RoomCoordinator;

/// Which room, if any, a connection currently belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Binding {
    #[default]
    Unbound,
    Bound { room: RoomKey, name: String },
}

impl Binding {
    /// Bound room key.
    #[must_use]
    pub fn room(&self) -> Option<&str> {
        match self {
            Self::Bound { room, .. } => Some(room),
            Self::Unbound => None,
        }
    }

    /// Bound display name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Bound { name, .. } => Some(name),
            Self::Unbound => None,
        }
    }

    #[must_use]
    pub const fn is_bound(&self) -> bool {
        matches!(self, Self::Bound { .. })
    }
}

/// State and event handling for one live connection.
///
/// Events must be fed in the order the connection sent them. The session is
/// consumed by [`ConnectionSession::disconnect`], so cleanup runs once.
pub struct ConnectionSession<E> {
    id: ConnectionId,
    outbox: EventSender,
    binding: Binding,
    rooms: RoomCoordinator<E>,
}

impl<E: ExecutionBackend + 'static> ConnectionSession<E> {
    pub(crate) const fn new(
        id: ConnectionId,
        outbox: EventSender,
        rooms: RoomCoordinator<E>,
    ) -> Self {
        Self {
            id,
            outbox,
            binding: Binding::Unbound,
            rooms,
        }
    }

    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    #[must_use]
    pub const fn binding(&self) -> &Binding {
        &self.binding
    }

    /// Apply one event from this connection.
    pub fn handle(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::Join { room, name } => self.join(room, name),
            ClientEvent::LeaveRoom => self.leave_room(),
            ClientEvent::Ping => self.reply(ServerEvent::Pong),
            event => self.relay(event),
        }
    }

    /// Send an event to this connection only.
    pub fn reply(&self, event: ServerEvent) {
        // Receiver gone means the socket is closing; disconnect follows.
        let _ = self.outbox.send(event);
    }

    /// Bind to `room` as `name`, leaving any current room first.
    pub fn join(&mut self, room: RoomKey, name: String) {
        self.leave_room();

        let registry = self.rooms.registry();
        let broadcaster = self.rooms.broadcaster();

        broadcaster.join(&room, self.id, self.outbox.clone());
        registry.ensure_room(&room);
        let members = registry.add_member_with(&room, &name, |members| {
            broadcaster.membership(&room, members.to_vec());
            members.len()
        });
        info!(
            conn = %self.id,
            room = %room,
            name = %name,
            members,
            "Joined room"
        );

        self.binding = Binding::Bound { room, name };
    }

    /// Leave the current room. Does nothing while unbound.
    pub fn leave_room(&mut self) {
        let Binding::Bound { room, name } = std::mem::take(&mut self.binding) else {
            return;
        };

        let broadcaster = self.rooms.broadcaster();
        broadcaster.leave(&room, self.id);
        let members = self.rooms.registry().remove_member_with(&room, &name, |members| {
            broadcaster.membership(&room, members.to_vec());
            members.len()
        });
        info!(
            conn = %self.id,
            room = %room,
            name = %name,
            members,
            "Left room"
        );
    }

    /// Transport is gone: leave the room if bound and drop the session.
    pub fn disconnect(mut self) {
        self.leave_room();
        debug!(conn = %self.id, "Connection closed");
    }

    /// Room an event goes to: its own `roomId` if it carries one, else the
    /// bound room. `None` while unbound.
    fn target(&self, event: &ClientEvent) -> Option<(RoomKey, &str)> {
        let Binding::Bound { room, name } = &self.binding else {
            debug!(
                conn = %self.id,
                event = event.name(),
                "Ignoring event from unbound connection"
            );
            return None;
        };
        let target = event.room_hint().unwrap_or(room);
        if target != room {
            debug!(
                conn = %self.id,
                event = event.name(),
                target,
                room = %room,
                "Routing event outside the bound room"
            );
        }
        Some((target.to_string(), name))
    }

    fn relay(&self, event: ClientEvent) {
        let Some((room, name)) = self.target(&event) else {
            return;
        };
        let broadcaster = self.rooms.broadcaster();

        match event {
            ClientEvent::CodeChange { code, .. } => {
                broadcaster.code_update(&room, self.id, code);
            }
            ClientEvent::Typing { .. } => {
                broadcaster.typing(&room, self.id, name.to_string());
            }
            ClientEvent::LanguageChange { language, .. } => {
                broadcaster.language_update(&room, language);
            }
            ClientEvent::CompileCode { code, language, .. } => {
                self.rooms.execute(&room, code, language);
            }
            ClientEvent::Join { .. } | ClientEvent::LeaveRoom | ClientEvent::Ping => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Barrier, thread};

    use async_trait::async_trait;
    use coderoom_core::{ExecutionError, ExecutionOutput, ExecutionRequest};
    use tokio::sync::mpsc;

    use super::*;

    struct Unused;

    #[async_trait]
    impl ExecutionBackend for Unused {
        async fn execute(
            &self,
            _request: &ExecutionRequest,
        ) -> Result<ExecutionOutput, ExecutionError> {
            Err(ExecutionError::Http("not wired".into()))
        }
    }

    fn connect(
        rooms: &RoomCoordinator<Unused>,
    ) -> (ConnectionSession<Unused>, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (rooms.connect(tx), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    fn joined(names: &[&str]) -> ServerEvent {
        ServerEvent::UserJoined(names.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn test_binding_accessors() {
        let bound = Binding::Bound {
            room: "r1".into(),
            name: "alice".into(),
        };
        assert!(bound.is_bound());
        assert_eq!(bound.room(), Some("r1"));
        assert_eq!(bound.name(), Some("alice"));
        assert_eq!(Binding::default().room(), None);
    }

    #[test]
    fn test_join_binds_and_announces() {
        let rooms = RoomCoordinator::new(Unused);
        let (mut a, mut rx) = connect(&rooms);

        a.join("r1".into(), "alice".into());

        assert_eq!(a.binding().room(), Some("r1"));
        assert_eq!(rooms.registry().members_of("r1"), vec!["alice"]);
        assert_eq!(drain(&mut rx), vec![joined(&["alice"])]);
    }

    #[test]
    fn test_repeated_join_keeps_single_entry() {
        let rooms = RoomCoordinator::new(Unused);
        let (mut a, _rx) = connect(&rooms);

        for _ in 0..3 {
            a.join("r1".into(), "alice".into());
        }

        assert_eq!(rooms.registry().members_of("r1"), vec!["alice"]);
        assert_eq!(rooms.broadcaster().audience_size("r1"), 1);
    }

    #[test]
    fn test_switching_rooms_announces_both() {
        let rooms = RoomCoordinator::new(Unused);
        let (mut a, mut rx_a) = connect(&rooms);
        let (mut b, mut rx_b) = connect(&rooms);
        let (mut c, mut rx_c) = connect(&rooms);
        b.join("r1".into(), "bob".into());
        c.join("r2".into(), "carol".into());
        a.join("r1".into(), "alice".into());
        drain(&mut rx_a);
        drain(&mut rx_b);
        drain(&mut rx_c);

        a.join("r2".into(), "alice".into());

        assert_eq!(rooms.registry().members_of("r1"), vec!["bob"]);
        assert_eq!(rooms.registry().members_of("r2"), vec!["alice", "carol"]);
        assert_eq!(drain(&mut rx_b), vec![joined(&["bob"])]);
        assert_eq!(drain(&mut rx_c), vec![joined(&["alice", "carol"])]);
        assert_eq!(drain(&mut rx_a), vec![joined(&["alice", "carol"])]);
    }

    #[test]
    fn test_leave_room_twice_is_noop() {
        let rooms = RoomCoordinator::new(Unused);
        let (mut a, mut rx_a) = connect(&rooms);
        let (mut b, mut rx_b) = connect(&rooms);
        a.join("r1".into(), "alice".into());
        b.join("r1".into(), "bob".into());
        drain(&mut rx_a);
        drain(&mut rx_b);

        a.leave_room();
        a.leave_room();

        assert!(!a.binding().is_bound());
        assert_eq!(rooms.registry().members_of("r1"), vec!["bob"]);
        assert_eq!(drain(&mut rx_b), vec![joined(&["bob"])]);
        // The leaver is out of the audience before the snapshot goes out.
        assert!(drain(&mut rx_a).is_empty());
    }

    #[test]
    fn test_disconnect_after_leave() {
        let rooms = RoomCoordinator::new(Unused);
        let (mut a, _rx_a) = connect(&rooms);
        let (mut b, mut rx_b) = connect(&rooms);
        a.join("r1".into(), "alice".into());
        b.join("r1".into(), "bob".into());
        drain(&mut rx_b);

        a.leave_room();
        a.disconnect();

        assert_eq!(drain(&mut rx_b), vec![joined(&["bob"])]);
    }

    #[test]
    fn test_unbound_events_are_ignored() {
        let rooms = RoomCoordinator::new(Unused);
        let (mut a, mut rx_a) = connect(&rooms);
        let (mut b, mut rx_b) = connect(&rooms);
        b.join("r1".into(), "bob".into());
        drain(&mut rx_b);

        a.handle(ClientEvent::CodeChange {
            room: Some("r1".into()),
            code: "x".into(),
        });
        a.handle(ClientEvent::LanguageChange {
            room: Some("r1".into()),
            language: "java".into(),
        });
        a.handle(ClientEvent::LeaveRoom);

        assert!(drain(&mut rx_a).is_empty());
        assert!(drain(&mut rx_b).is_empty());
    }

    #[test]
    fn test_room_hint_overrides_bound_room() {
        let rooms = RoomCoordinator::new(Unused);
        let (mut a, mut rx_a) = connect(&rooms);
        let (mut b, mut rx_b) = connect(&rooms);
        let (mut c, mut rx_c) = connect(&rooms);
        a.join("r1".into(), "alice".into());
        c.join("r1".into(), "carol".into());
        b.join("r2".into(), "bob".into());
        drain(&mut rx_a);
        drain(&mut rx_b);
        drain(&mut rx_c);

        a.handle(ClientEvent::CodeChange {
            room: Some("r2".into()),
            code: "x".into(),
        });
        a.handle(ClientEvent::Typing {
            room: Some("r2".into()),
            name: None,
        });

        assert_eq!(
            drain(&mut rx_b),
            vec![
                ServerEvent::CodeUpdate("x".into()),
                ServerEvent::UserTyping("alice".into()),
            ]
        );
        assert!(drain(&mut rx_c).is_empty());
        assert_eq!(a.binding().room(), Some("r1"));

        a.handle(ClientEvent::LanguageChange {
            room: None,
            language: "cpp".into(),
        });
        assert_eq!(drain(&mut rx_c), vec![ServerEvent::LanguageUpdate("cpp".into())]);
        assert!(drain(&mut rx_b).is_empty());
    }

    fn last_membership(rx: &mut mpsc::UnboundedReceiver<ServerEvent>) -> Option<ServerEvent> {
        drain(rx)
            .into_iter()
            .rev()
            .find(|event| matches!(event, ServerEvent::UserJoined(_)))
    }

    #[test]
    fn test_concurrent_joins_end_with_current_membership() {
        for _ in 0..300 {
            let rooms = RoomCoordinator::new(Unused);
            let (mut a, mut rx_a) = connect(&rooms);
            let (mut b, mut rx_b) = connect(&rooms);
            let (mut c, mut rx_c) = connect(&rooms);
            c.join("r1".into(), "carol".into());
            let barrier = Barrier::new(2);

            thread::scope(|scope| {
                scope.spawn(|| {
                    barrier.wait();
                    a.join("r1".into(), "alice".into());
                });
                scope.spawn(|| {
                    barrier.wait();
                    b.join("r1".into(), "bob".into());
                });
            });

            let current = Some(ServerEvent::UserJoined(rooms.registry().members_of("r1")));
            assert_eq!(last_membership(&mut rx_a), current);
            assert_eq!(last_membership(&mut rx_b), current);
            assert_eq!(last_membership(&mut rx_c), current);

            thread::scope(|scope| {
                scope.spawn(|| {
                    barrier.wait();
                    a.leave_room();
                });
                scope.spawn(|| {
                    barrier.wait();
                    b.join("r1".into(), "bobby".into());
                });
            });

            let current = Some(joined(&["bobby", "carol"]));
            assert_eq!(rooms.registry().members_of("r1"), vec!["bobby", "carol"]);
            assert_eq!(last_membership(&mut rx_b), current);
            assert_eq!(last_membership(&mut rx_c), current);
        }
    }

    #[test]
    fn test_typing_uses_bound_name() {
        let rooms = RoomCoordinator::new(Unused);
        let (mut a, mut rx_a) = connect(&rooms);
        let (mut b, mut rx_b) = connect(&rooms);
        a.join("r1".into(), "alice".into());
        b.join("r1".into(), "bob".into());
        drain(&mut rx_a);
        drain(&mut rx_b);

        a.handle(ClientEvent::Typing {
            room: None,
            name: Some("mallory".into()),
        });

        assert_eq!(drain(&mut rx_b), vec![ServerEvent::UserTyping("alice".into())]);
        assert!(drain(&mut rx_a).is_empty());
    }

    #[test]
    fn test_ping_answers_sender_only() {
        let rooms = RoomCoordinator::new(Unused);
        let (mut a, mut rx_a) = connect(&rooms);

        a.handle(ClientEvent::Ping);

        assert_eq!(drain(&mut rx_a), vec![ServerEvent::Pong]);
    }
}
