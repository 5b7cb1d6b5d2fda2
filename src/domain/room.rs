use std::cmp::Ordering;

use super::ids::{RoomId, UserId};
use super::message::MessageKind;

/// Live presence of the counterpart, as last reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LiveStatus {
    Online,
    Offline,
    /// The wire payload did not carry a presence field.
    #[default]
    Unknown,
}

/// The other participant of a two-party conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: UserId,
    pub display_name: String,
    pub avatar_ref: Option<String>,
    pub live_status: LiveStatus,
}

/// Summary of a room's most recent message, used for list previews and
/// ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSummary {
    pub kind: MessageKind,
    pub preview: String,
    pub created_at_ms: Option<i64>,
}

/// A conversation between the local user and one counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub other_participant: Participant,
    pub last_message: Option<MessageSummary>,
    pub unread_count: u32,
    pub created_at_ms: Option<i64>,
    pub updated_at_ms: Option<i64>,
}

impl Room {
    /// Primary sort key for the room list: the last message's timestamp,
    /// falling back to the room's update and creation times.
    pub fn activity_ms(&self) -> i64 {
        self.last_message
            .as_ref()
            .and_then(|summary| summary.created_at_ms)
            .or(self.updated_at_ms)
            .or(self.created_at_ms)
            .unwrap_or(0)
    }
}

/// Total order for the room list: most recent activity first, ties broken by
/// id ascending so equal-activity rooms keep a stable position.
pub fn compare_by_activity(a: &Room, b: &Room) -> Ordering {
    b.activity_ms()
        .cmp(&a.activity_ms())
        .then_with(|| a.id.cmp(&b.id))
}
