use super::ids::{RoomId, UserId};
use super::message::{Message, MessageKind};
use super::notice::StatusEvent;
use super::room::Room;

/// Connection health of the underlying channel, surfaced as a flag only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

/// Typed server events after wire decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Full room list snapshot; replaces directory state wholesale.
    RoomSnapshot(Vec<Room>),
    RoomCreated(Room),
    RoomUpdated(Room),
    /// One page of message history for a room.
    MessagePage {
        room_id: RoomId,
        messages: Vec<Message>,
        is_new_room: bool,
    },
    NewMessage(Message),
    /// `user_id` has seen the messages of `room_id` up to now.
    MessagesSeen { room_id: RoomId, user_id: UserId },
    SystemNotification(StatusEvent),
}

/// Everything the engine consumes from the channel, including lifecycle
/// signals from the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Connected,
    Disconnected,
    Server(ServerEvent),
}

/// Typed outbound events, encoded to the wire by the channel layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    RequestRoomList,
    RequestMessagePage {
        other_user_id: UserId,
        page: u32,
        size: u32,
    },
    MarkSeen {
        room_id: RoomId,
    },
    JoinRoom {
        room_id: RoomId,
    },
    SendMessage {
        room_id: RoomId,
        kind: MessageKind,
        content: String,
        file_name: Option<String>,
        system_meta: Option<serde_json::Value>,
    },
}
