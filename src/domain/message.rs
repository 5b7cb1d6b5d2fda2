use std::collections::BTreeSet;

use super::ids::{MessageId, RoomId, UserId};

/// Kind of message, mirroring the server's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    Video,
    Audio,
    File,
    Product,
    System,
    OrderStatus,
    PaymentStatus,
    ShippingStatus,
}

impl MessageKind {
    /// Returns a bracketed label for media kinds, or None when the message
    /// content itself is the preview.
    pub fn preview_label(&self) -> Option<&'static str> {
        match self {
            MessageKind::Image => Some("[Image]"),
            MessageKind::Video => Some("[Video]"),
            MessageKind::Audio => Some("[Audio]"),
            MessageKind::File => Some("[File]"),
            MessageKind::Product => Some("[Product]"),
            MessageKind::Text
            | MessageKind::System
            | MessageKind::OrderStatus
            | MessageKind::PaymentStatus
            | MessageKind::ShippingStatus => None,
        }
    }

    /// System-generated notices that must not trigger a seen acknowledgement
    /// when they arrive in the active room.
    pub fn is_status_notice(&self) -> bool {
        matches!(
            self,
            MessageKind::System | MessageKind::OrderStatus | MessageKind::PaymentStatus
        )
    }
}

/// Pointer to binary content hosted outside the chat channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    pub url: String,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub room_id: RoomId,
    pub sender: UserId,
    pub kind: MessageKind,
    pub content: String,
    pub media_ref: Option<MediaRef>,
    pub created_at_ms: i64,
    pub seen_by: BTreeSet<UserId>,
}

impl Message {
    pub fn is_from(&self, user: &UserId) -> bool {
        &self.sender == user
    }

    /// Returns the preview text: media label + content, or just the content.
    pub fn preview(&self) -> String {
        match (self.kind.preview_label(), self.content.is_empty()) {
            (Some(label), true) => label.to_owned(),
            (Some(label), false) => format!("{} {}", label, self.content),
            (None, _) => self.content.clone(),
        }
    }
}
