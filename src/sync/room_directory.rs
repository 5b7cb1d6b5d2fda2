use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::domain::ids::RoomId;
use crate::domain::room::Room;
use crate::domain::room_list_state::RoomListState;

const ROOM_CREATED_DUPLICATE: &str = "ROOM_CREATED_DUPLICATE";

/// The ordered room list with per-room debouncing of update events.
///
/// A new message followed immediately by a read-receipt update arrives as a
/// burst of `roomUpdated` events for the same room; applying each one would
/// re-sort the list several times in quick succession. Updates are therefore
/// held back per room id for a short window, and a newer update restarts
/// that room's timer, so only the last payload of a burst is applied.
///
/// Time is injected: callers pass `Instant`s into [`on_room_updated`] and
/// [`drain_due`], which keeps expiry deterministic under test. The engine's
/// tick loop drives draining.
///
/// [`on_room_updated`]: RoomDirectory::on_room_updated
/// [`drain_due`]: RoomDirectory::drain_due
#[derive(Debug)]
pub struct RoomDirectory {
    list: RoomListState,
    pending: HashMap<RoomId, PendingUpdate>,
    debounce: Duration,
}

#[derive(Debug, Clone)]
struct PendingUpdate {
    room: Room,
    fire_at: Instant,
}

impl RoomDirectory {
    pub fn new(debounce: Duration) -> Self {
        Self {
            list: RoomListState::default(),
            pending: HashMap::new(),
            debounce,
        }
    }

    pub fn rooms(&self) -> &[Room] {
        self.list.rooms()
    }

    pub fn get(&self, id: &RoomId) -> Option<&Room> {
        self.list.get(id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Replaces the directory from a full snapshot, preserving no stale
    /// entries. Pending debounced updates stay armed: they carry events
    /// newer than the snapshot request and apply on top once due.
    pub fn apply_snapshot(&mut self, rooms: Vec<Room>) {
        self.list.replace_all(rooms);
    }

    /// Inserts a newly created room; duplicate creation events are no-ops.
    pub fn on_room_created(&mut self, room: Room) {
        let id = room.id.clone();
        if !self.list.insert_new(room) {
            tracing::debug!(
                code = ROOM_CREATED_DUPLICATE,
                room_id = %id,
                "ignoring duplicate room creation"
            );
        }
    }

    /// Schedules `room` to be applied once its debounce window expires. A
    /// newer update for the same id replaces the payload and restarts the
    /// window (last write wins).
    pub fn on_room_updated(&mut self, room: Room, now: Instant) {
        let fire_at = now + self.debounce;
        self.pending.insert(room.id.clone(), PendingUpdate { room, fire_at });
    }

    /// Applies every pending update whose window has expired, oldest first.
    /// Returns the applied rooms so the caller can reconcile the active
    /// feed's metadata.
    pub fn drain_due(&mut self, now: Instant) -> Vec<Room> {
        let mut due: Vec<(Instant, RoomId)> = self
            .pending
            .iter()
            .filter(|(_, update)| update.fire_at <= now)
            .map(|(id, update)| (update.fire_at, id.clone()))
            .collect();
        due.sort();

        let mut applied = Vec::with_capacity(due.len());
        for (_, id) in due {
            if let Some(update) = self.pending.remove(&id) {
                self.list.upsert(update.room.clone());
                applied.push(update.room);
            }
        }
        applied
    }

    /// Earliest pending expiry, for scheduling the next tick.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|update| update.fire_at).min()
    }

    /// Drops all pending updates without applying them. Teardown path: a
    /// debounce must never fire against a dismantled view.
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }
}
