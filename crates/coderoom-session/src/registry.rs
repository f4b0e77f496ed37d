//! Process-wide room membership.

use std::{
    collections::{BTreeSet, HashMap},
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use coderoom_core::RoomKey;

type Rooms = HashMap<RoomKey, BTreeSet<String>>;

/// Maps each room to the display names currently joined to it.
///
/// Every operation takes the lock once and never holds it across an await,
/// so each call is atomic with respect to every other call. Names are a set:
/// two connections joined under the same name share one entry.
pub struct SessionRegistry {
    rooms: RwLock<Rooms>,
    prune_empty: bool,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    /// Create an empty registry that forgets rooms once they empty.
    #[must_use]
    pub fn new() -> Self {
        Self::with_pruning(true)
    }

    /// Create an empty registry, choosing whether empty rooms are dropped.
    #[must_use]
    pub fn with_pruning(prune_empty: bool) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            prune_empty,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Rooms> {
        self.rooms.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Rooms> {
        self.rooms.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create an empty membership set for `room` if it has none.
    pub fn ensure_room(&self, room: &str) {
        self.write().entry(room.to_string()).or_default();
    }

    /// Add `name` to `room`, creating the room if needed.
    ///
    /// Returns the membership snapshot right after the insert.
    pub fn add_member(&self, room: &str, name: &str) -> Vec<String> {
        self.add_member_with(room, name, <[String]>::to_vec)
    }

    /// Add `name` to `room` and pass the resulting snapshot to `publish`
    /// before the lock is released.
    ///
    /// Snapshots of one room reach `publish` in the order the mutations
    /// happened, so the last one published always matches the registry.
    /// `publish` must not call back into the registry.
    pub fn add_member_with<R>(
        &self,
        room: &str,
        name: &str,
        publish: impl FnOnce(&[String]) -> R,
    ) -> R {
        let mut rooms = self.write();
        let members = rooms.entry(room.to_string()).or_default();
        members.insert(name.to_string());
        let snapshot: Vec<String> = members.iter().cloned().collect();
        publish(&snapshot)
    }

    /// Remove `name` from `room`. Unknown rooms and non-members are ignored.
    ///
    /// Returns the membership snapshot right after the removal. With pruning
    /// on, a room left empty is dropped under the same lock.
    pub fn remove_member(&self, room: &str, name: &str) -> Vec<String> {
        self.remove_member_with(room, name, <[String]>::to_vec)
    }

    /// Remove `name` from `room` and pass the resulting snapshot to
    /// `publish` before the lock is released. An unknown room publishes an
    /// empty snapshot. Same ordering rules as [`Self::add_member_with`].
    pub fn remove_member_with<R>(
        &self,
        room: &str,
        name: &str,
        publish: impl FnOnce(&[String]) -> R,
    ) -> R {
        let mut rooms = self.write();
        let Some(members) = rooms.get_mut(room) else {
            return publish(&[]);
        };
        members.remove(name);
        let snapshot: Vec<String> = members.iter().cloned().collect();
        if snapshot.is_empty() && self.prune_empty {
            rooms.remove(room);
        }
        publish(&snapshot)
    }

    /// Snapshot of the names in `room`, in a stable order.
    #[must_use]
    pub fn members_of(&self, room: &str) -> Vec<String> {
        self.read()
            .get(room)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether `room` has at least one member.
    #[must_use]
    pub fn contains(&self, room: &str) -> bool {
        self.read().get(room).is_some_and(|members| !members.is_empty())
    }

    /// Number of rooms currently tracked, empty ones included.
    #[must_use]
    pub fn room_count(&self) -> usize {
        self.read().len()
    }
}
