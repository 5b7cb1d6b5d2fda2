//! JSON codec for the socket event contract.
//!
//! Decoding is defensive: payloads missing a required identity field produce
//! a [`WireError`] for the caller to log and drop, and a bad entry inside a
//! list payload drops that entry without sinking the rest.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::domain::events::ServerEvent;
use crate::domain::ids::{MessageId, RoomId, UserId};
use crate::domain::message::{MediaRef, Message, MessageKind};
use crate::domain::notice::{StatusEvent, StatusEventKind, StatusMeta};
use crate::domain::room::{LiveStatus, MessageSummary, Participant, Room};

pub const EV_GET_CHAT_ROOMS: &str = "getChatRooms";
pub const EV_CHAT_ROOMS_LIST: &str = "chatRoomsList";
pub const EV_CHAT_ROOMS: &str = "chatRooms";
pub const EV_NEW_CHAT_ROOM: &str = "newChatRoom";
pub const EV_ROOM_UPDATED: &str = "roomUpdated";
pub const EV_GET_MESSAGES_WITH_USER: &str = "getMessagesWithUser";
pub const EV_MESSAGE_LIST: &str = "messageList";
pub const EV_NEW_MESSAGE: &str = "newMessage";
pub const EV_MARK_MESSAGES_AS_SEEN: &str = "markMessagesAsSeen";
pub const EV_MESSAGES_SEEN: &str = "messagesSeen";
pub const EV_JOIN_ROOM: &str = "joinRoom";
pub const EV_SEND_MESSAGE: &str = "sendMessage";
pub const EV_SYSTEM_NOTIFICATION: &str = "systemNotification";

const WIRE_ROOM_ENTRY_DROPPED: &str = "WIRE_ROOM_ENTRY_DROPPED";
const WIRE_MESSAGE_ENTRY_DROPPED: &str = "WIRE_MESSAGE_ENTRY_DROPPED";

#[derive(Debug, Error)]
pub enum WireError {
    #[error("unknown event: {0}")]
    UnknownEvent(String),
    #[error("malformed {event} payload: {source}")]
    Malformed {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{event} payload missing required field: {field}")]
    MissingField {
        event: &'static str,
        field: &'static str,
    },
    #[error("unsupported {event} kind: {kind}")]
    UnsupportedKind {
        event: &'static str,
        kind: String,
    },
}

/// Decodes an inbound `(event, payload)` pair into a typed server event.
pub fn decode_server_event(event: &str, payload: Value) -> Result<ServerEvent, WireError> {
    match event {
        EV_CHAT_ROOMS_LIST | EV_CHAT_ROOMS => decode_room_snapshot(payload),
        EV_NEW_CHAT_ROOM => Ok(ServerEvent::RoomCreated(decode_room(
            payload,
            EV_NEW_CHAT_ROOM,
        )?)),
        EV_ROOM_UPDATED => Ok(ServerEvent::RoomUpdated(decode_room(
            payload,
            EV_ROOM_UPDATED,
        )?)),
        EV_MESSAGE_LIST => decode_message_list(payload),
        EV_NEW_MESSAGE => Ok(ServerEvent::NewMessage(decode_message(
            payload,
            EV_NEW_MESSAGE,
        )?)),
        EV_MESSAGES_SEEN => decode_messages_seen(payload),
        EV_SYSTEM_NOTIFICATION => decode_system_notification(payload),
        other => Err(WireError::UnknownEvent(other.to_owned())),
    }
}

/// Encodes an outbound command into its `(event, payload)` wire pair.
pub fn encode_command(command: &crate::domain::events::ClientCommand) -> (&'static str, Value) {
    use crate::domain::events::ClientCommand;

    match command {
        ClientCommand::RequestRoomList => (EV_GET_CHAT_ROOMS, json!({})),
        ClientCommand::RequestMessagePage {
            other_user_id,
            page,
            size,
        } => (
            EV_GET_MESSAGES_WITH_USER,
            json!({
                "otherUserId": other_user_id.as_str(),
                "pageNo": page,
                "size": size,
            }),
        ),
        ClientCommand::MarkSeen { room_id } => (
            EV_MARK_MESSAGES_AS_SEEN,
            json!({ "roomId": room_id.as_str() }),
        ),
        // The contract takes the bare room id here, not an object.
        ClientCommand::JoinRoom { room_id } => (EV_JOIN_ROOM, json!(room_id.as_str())),
        ClientCommand::SendMessage {
            room_id,
            kind,
            content,
            file_name,
            system_meta,
        } => {
            let mut payload = json!({
                "roomId": room_id.as_str(),
                "type": kind_to_wire(*kind),
                "content": content,
            });
            if let Some(name) = file_name {
                payload["fileName"] = json!(name);
            }
            if let Some(meta) = system_meta {
                payload["systemMeta"] = meta.clone();
            }
            (EV_SEND_MESSAGE, payload)
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireTimestamp {
    Millis(i64),
    Text(String),
}

impl WireTimestamp {
    fn unix_ms(&self) -> Option<i64> {
        match self {
            WireTimestamp::Millis(value) => Some(*value),
            WireTimestamp::Text(text) => chrono::DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|parsed| parsed.timestamp_millis()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireParticipant {
    id: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    avatar_ref: Option<String>,
    #[serde(default)]
    live_status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessageSummary {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    created_at: Option<WireTimestamp>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRoom {
    id: Option<String>,
    other_participant: Option<WireParticipant>,
    #[serde(default)]
    last_message: Option<WireMessageSummary>,
    #[serde(default)]
    unread_count: u32,
    #[serde(default)]
    created_at: Option<WireTimestamp>,
    #[serde(default)]
    updated_at: Option<WireTimestamp>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireRoomSnapshot {
    Wrapped {
        #[serde(rename = "chatRooms")]
        chat_rooms: Vec<Value>,
    },
    Bare(Vec<Value>),
}

#[derive(Debug, Deserialize)]
struct WireSender {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireMediaRef {
    Detailed {
        url: String,
        #[serde(rename = "fileName", default)]
        file_name: Option<String>,
    },
    Url(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage {
    id: Option<String>,
    #[serde(alias = "roomId")]
    chat_room_id: Option<String>,
    sender: Option<WireSender>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    content: String,
    #[serde(default)]
    media_ref: Option<WireMediaRef>,
    #[serde(default)]
    created_at: Option<WireTimestamp>,
    #[serde(default)]
    seen_by: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessageList {
    #[serde(alias = "roomId")]
    chat_room_id: Option<String>,
    #[serde(default)]
    messages: Vec<Value>,
    #[serde(default)]
    is_new_room: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessagesSeen {
    #[serde(alias = "chatRoomId")]
    room_id: Option<String>,
    user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireStatusMeta {
    #[serde(default, alias = "orderId", alias = "paymentId")]
    reference: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireNotification {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    meta: WireStatusMeta,
}

fn decode_room_snapshot(payload: Value) -> Result<ServerEvent, WireError> {
    let snapshot: WireRoomSnapshot =
        serde_json::from_value(payload).map_err(|source| WireError::Malformed {
            event: EV_CHAT_ROOMS_LIST,
            source,
        })?;

    let entries = match snapshot {
        WireRoomSnapshot::Wrapped { chat_rooms } => chat_rooms,
        WireRoomSnapshot::Bare(rooms) => rooms,
    };

    let mut rooms = Vec::with_capacity(entries.len());
    for entry in entries {
        match decode_room(entry, EV_CHAT_ROOMS_LIST) {
            Ok(room) => rooms.push(room),
            Err(error) => {
                tracing::warn!(
                    code = WIRE_ROOM_ENTRY_DROPPED,
                    error = %error,
                    "dropping malformed room entry from snapshot"
                );
            }
        }
    }

    Ok(ServerEvent::RoomSnapshot(rooms))
}

fn decode_room(payload: Value, event: &'static str) -> Result<Room, WireError> {
    let wire: WireRoom =
        serde_json::from_value(payload).map_err(|source| WireError::Malformed { event, source })?;

    let id = wire
        .id
        .ok_or(WireError::MissingField { event, field: "id" })?;
    let participant = wire.other_participant.ok_or(WireError::MissingField {
        event,
        field: "otherParticipant",
    })?;
    let participant_id = participant.id.ok_or(WireError::MissingField {
        event,
        field: "otherParticipant.id",
    })?;

    Ok(Room {
        id: RoomId::new(id),
        other_participant: Participant {
            id: UserId::new(participant_id),
            display_name: participant.display_name.unwrap_or_default(),
            avatar_ref: participant.avatar_ref,
            live_status: live_status_from_wire(participant.live_status.as_deref()),
        },
        last_message: wire.last_message.map(|summary| MessageSummary {
            kind: kind_from_wire(summary.kind.as_deref()),
            preview: summary.content.unwrap_or_default(),
            created_at_ms: summary.created_at.as_ref().and_then(WireTimestamp::unix_ms),
        }),
        unread_count: wire.unread_count,
        created_at_ms: wire.created_at.as_ref().and_then(WireTimestamp::unix_ms),
        updated_at_ms: wire.updated_at.as_ref().and_then(WireTimestamp::unix_ms),
    })
}

fn decode_message(payload: Value, event: &'static str) -> Result<Message, WireError> {
    let wire: WireMessage =
        serde_json::from_value(payload).map_err(|source| WireError::Malformed { event, source })?;

    let id = wire
        .id
        .ok_or(WireError::MissingField { event, field: "id" })?;
    let room_id = wire.chat_room_id.ok_or(WireError::MissingField {
        event,
        field: "chatRoomId",
    })?;
    let sender_id = wire
        .sender
        .and_then(|sender| sender.id)
        .ok_or(WireError::MissingField {
            event,
            field: "sender.id",
        })?;
    let created_at_ms = wire
        .created_at
        .as_ref()
        .and_then(WireTimestamp::unix_ms)
        .ok_or(WireError::MissingField {
            event,
            field: "createdAt",
        })?;

    Ok(Message {
        id: MessageId::new(id),
        room_id: RoomId::new(room_id),
        sender: UserId::new(sender_id),
        kind: kind_from_wire(wire.kind.as_deref()),
        content: wire.content,
        media_ref: wire.media_ref.map(|media| match media {
            WireMediaRef::Detailed { url, file_name } => MediaRef { url, file_name },
            WireMediaRef::Url(url) => MediaRef {
                url,
                file_name: None,
            },
        }),
        created_at_ms,
        seen_by: wire.seen_by.into_iter().map(UserId::new).collect::<BTreeSet<_>>(),
    })
}

fn decode_message_list(payload: Value) -> Result<ServerEvent, WireError> {
    let wire: WireMessageList =
        serde_json::from_value(payload).map_err(|source| WireError::Malformed {
            event: EV_MESSAGE_LIST,
            source,
        })?;

    let room_id = wire.chat_room_id.ok_or(WireError::MissingField {
        event: EV_MESSAGE_LIST,
        field: "chatRoomId",
    })?;

    let mut messages = Vec::with_capacity(wire.messages.len());
    for entry in wire.messages {
        match decode_message(entry, EV_MESSAGE_LIST) {
            Ok(message) => messages.push(message),
            Err(error) => {
                tracing::warn!(
                    code = WIRE_MESSAGE_ENTRY_DROPPED,
                    error = %error,
                    "dropping malformed message entry from history page"
                );
            }
        }
    }

    Ok(ServerEvent::MessagePage {
        room_id: RoomId::new(room_id),
        messages,
        is_new_room: wire.is_new_room,
    })
}

fn decode_messages_seen(payload: Value) -> Result<ServerEvent, WireError> {
    let wire: WireMessagesSeen =
        serde_json::from_value(payload).map_err(|source| WireError::Malformed {
            event: EV_MESSAGES_SEEN,
            source,
        })?;

    let room_id = wire.room_id.ok_or(WireError::MissingField {
        event: EV_MESSAGES_SEEN,
        field: "roomId",
    })?;
    let user_id = wire.user_id.ok_or(WireError::MissingField {
        event: EV_MESSAGES_SEEN,
        field: "userId",
    })?;

    Ok(ServerEvent::MessagesSeen {
        room_id: RoomId::new(room_id),
        user_id: UserId::new(user_id),
    })
}

fn decode_system_notification(payload: Value) -> Result<ServerEvent, WireError> {
    let wire: WireNotification =
        serde_json::from_value(payload).map_err(|source| WireError::Malformed {
            event: EV_SYSTEM_NOTIFICATION,
            source,
        })?;

    let raw_kind = wire.kind.ok_or(WireError::MissingField {
        event: EV_SYSTEM_NOTIFICATION,
        field: "type",
    })?;
    let kind = match raw_kind.as_str() {
        "ORDER_STATUS" => StatusEventKind::OrderStatus,
        "PAYMENT_STATUS" => StatusEventKind::PaymentStatus,
        _ => {
            return Err(WireError::UnsupportedKind {
                event: EV_SYSTEM_NOTIFICATION,
                kind: raw_kind,
            })
        }
    };

    Ok(ServerEvent::SystemNotification(StatusEvent {
        kind,
        meta: StatusMeta {
            reference: wire.meta.reference,
            status: wire.meta.status,
        },
    }))
}

fn live_status_from_wire(value: Option<&str>) -> LiveStatus {
    match value {
        Some(status) if status.eq_ignore_ascii_case("online") => LiveStatus::Online,
        Some(status) if status.eq_ignore_ascii_case("offline") => LiveStatus::Offline,
        _ => LiveStatus::Unknown,
    }
}

fn kind_from_wire(value: Option<&str>) -> MessageKind {
    match value {
        Some("TEXT") | None => MessageKind::Text,
        Some("IMAGE") => MessageKind::Image,
        Some("VIDEO") => MessageKind::Video,
        Some("AUDIO") => MessageKind::Audio,
        Some("FILE") => MessageKind::File,
        Some("PRODUCT") => MessageKind::Product,
        Some("SYSTEM") => MessageKind::System,
        Some("ORDER_STATUS") => MessageKind::OrderStatus,
        Some("PAYMENT_STATUS") => MessageKind::PaymentStatus,
        Some("SHIPPING_STATUS") => MessageKind::ShippingStatus,
        Some(other) => {
            tracing::debug!(kind = other, "unknown message type, rendering as text");
            MessageKind::Text
        }
    }
}

fn kind_to_wire(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Text => "TEXT",
        MessageKind::Image => "IMAGE",
        MessageKind::Video => "VIDEO",
        MessageKind::Audio => "AUDIO",
        MessageKind::File => "FILE",
        MessageKind::Product => "PRODUCT",
        MessageKind::System => "SYSTEM",
        MessageKind::OrderStatus => "ORDER_STATUS",
        MessageKind::PaymentStatus => "PAYMENT_STATUS",
        MessageKind::ShippingStatus => "SHIPPING_STATUS",
    }
}
