use super::ids::RoomId;
use super::room::{compare_by_activity, Room};

/// Ordered list of conversation rooms for the current user.
///
/// Rooms are unique by id and kept sorted by most recent activity
/// (`compare_by_activity`). All mutation goes through keyed operations so a
/// duplicate event can never produce a duplicate entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomListState {
    rooms: Vec<Room>,
}

impl RoomListState {
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn get(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.iter().find(|room| &room.id == id)
    }

    /// Replaces the list wholesale from a server snapshot. Duplicate ids in
    /// the payload collapse to the last occurrence.
    pub fn replace_all(&mut self, rooms: Vec<Room>) {
        self.rooms.clear();
        for room in rooms {
            self.rooms.retain(|existing| existing.id != room.id);
            self.rooms.push(room);
        }
        self.resort();
    }

    /// Inserts a newly created room. Returns false (and leaves the list
    /// untouched) when the id is already present.
    pub fn insert_new(&mut self, room: Room) -> bool {
        if self.get(&room.id).is_some() {
            return false;
        }

        self.rooms.push(room);
        self.resort();
        true
    }

    /// Replaces any existing entry with the same id and re-derives the order.
    pub fn upsert(&mut self, room: Room) {
        self.rooms.retain(|existing| existing.id != room.id);
        self.rooms.push(room);
        self.resort();
    }

    fn resort(&mut self) {
        self.rooms.sort_by(compare_by_activity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::UserId;
    use crate::domain::message::MessageKind;
    use crate::domain::room::{LiveStatus, MessageSummary, Participant};

    fn room(id: &str, activity_ms: i64) -> Room {
        Room {
            id: RoomId::new(id),
            other_participant: Participant {
                id: UserId::new("u1"),
                display_name: "Counterpart".to_owned(),
                avatar_ref: None,
                live_status: LiveStatus::Unknown,
            },
            last_message: Some(MessageSummary {
                kind: MessageKind::Text,
                preview: "hi".to_owned(),
                created_at_ms: Some(activity_ms),
            }),
            unread_count: 0,
            created_at_ms: None,
            updated_at_ms: None,
        }
    }

    fn ids(state: &RoomListState) -> Vec<&str> {
        state.rooms().iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn snapshot_orders_by_activity_descending() {
        let mut state = RoomListState::default();

        state.replace_all(vec![room("b", 5), room("a", 10)]);

        assert_eq!(ids(&state), vec!["a", "b"]);
    }

    #[test]
    fn snapshot_replaces_previous_entries_wholesale() {
        let mut state = RoomListState::default();
        state.replace_all(vec![room("stale", 99)]);

        state.replace_all(vec![room("fresh", 1)]);

        assert_eq!(ids(&state), vec!["fresh"]);
    }

    #[test]
    fn snapshot_collapses_duplicate_ids_to_last_occurrence() {
        let mut state = RoomListState::default();

        state.replace_all(vec![room("a", 10), room("a", 30)]);

        assert_eq!(state.len(), 1);
        assert_eq!(state.get(&RoomId::new("a")).map(Room::activity_ms), Some(30));
    }

    #[test]
    fn insert_new_is_a_noop_for_known_ids() {
        let mut state = RoomListState::default();
        state.replace_all(vec![room("a", 10)]);

        let inserted = state.insert_new(room("a", 999));

        assert!(!inserted);
        assert_eq!(state.get(&RoomId::new("a")).map(Room::activity_ms), Some(10));
    }

    #[test]
    fn insert_new_places_room_by_activity() {
        let mut state = RoomListState::default();
        state.replace_all(vec![room("a", 10), room("c", 5)]);

        assert!(state.insert_new(room("b", 7)));

        assert_eq!(ids(&state), vec!["a", "b", "c"]);
    }

    #[test]
    fn upsert_moves_a_room_when_its_activity_advances() {
        let mut state = RoomListState::default();
        state.replace_all(vec![room("a", 10), room("b", 5)]);

        state.upsert(room("b", 20));

        assert_eq!(ids(&state), vec!["b", "a"]);
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn equal_activity_keeps_id_order_stable() {
        let mut state = RoomListState::default();

        state.replace_all(vec![room("b", 10), room("a", 10), room("c", 10)]);

        assert_eq!(ids(&state), vec!["a", "b", "c"]);
    }
}
