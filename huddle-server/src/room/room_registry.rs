use crate::room::Room;
use dashmap::DashMap;
use huddle_core::RoomId;
use std::sync::Arc;
use tracing::info;

/// Concurrent map of live rooms.
///
/// Built once at startup and passed to whoever admits connections; clones share
/// the same map. Lookups on different shards never contend, and every mutation
/// of an entry is atomic with respect to lookups of that entry.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<RoomId, Arc<Room>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never creates; callers decide what a miss means.
    pub fn get(&self, room_id: &RoomId) -> Option<Arc<Room>> {
        self.rooms.get(room_id).map(|room| room.value().clone())
    }

    /// Stores a fresh empty room, replacing (and closing) any previous one.
    pub fn create(&self, room_id: RoomId) -> Arc<Room> {
        info!("Creating new room: {}", room_id);
        let room = Arc::new(Room::new(room_id.clone()));

        if let Some(previous) = self.rooms.insert(room_id, room.clone()) {
            let evicted = previous.close();
            info!(room = %previous.id(), evicted, "Replaced existing room");
        }
        room
    }

    pub fn get_or_create(&self, room_id: &RoomId) -> Arc<Room> {
        if let Some(room) = self.get(room_id) {
            return room;
        }

        self.rooms
            .entry(room_id.clone())
            .or_insert_with(|| {
                info!("Creating new room: {}", room_id);
                Arc::new(Room::new(room_id.clone()))
            })
            .value()
            .clone()
    }

    /// Removes the room and disconnects everyone in it. Unknown ids are ignored.
    pub fn delete(&self, room_id: &RoomId) -> bool {
        let Some((_, room)) = self.rooms.remove(room_id) else {
            return false;
        };

        let evicted = room.close();
        info!(room = %room_id, evicted, "Room deleted");
        true
    }

    /// Drops `room` from the map if it is still the registered instance and has
    /// no members left. The room is sealed under the entry lock, so a concurrent
    /// admission either lands before the check or sees a closed room and retries.
    pub fn release_if_empty(&self, room: &Arc<Room>) -> bool {
        let removed = self
            .rooms
            .remove_if(room.id(), |_, current| {
                Arc::ptr_eq(current, room) && current.seal_if_empty()
            })
            .is_some();

        if removed {
            info!(room = %room.id(), "Removed empty room");
        }
        removed
    }

    /// Forgets `room` if it is still the registered instance.
    pub(crate) fn discard(&self, room: &Arc<Room>) {
        self.rooms
            .remove_if(room.id(), |_, current| Arc::ptr_eq(current, room));
    }

    pub fn participant_count(&self, room_id: &RoomId) -> Option<usize> {
        self.get(room_id).map(|room| room.participant_count())
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
