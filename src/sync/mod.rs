//! Sync layer: application workflows that keep the room list, the active
//! feed, seen receipts, and transient notices consistent against the
//! channel's at-least-once, possibly re-ordered deliveries.

pub mod engine;
pub mod message_feed;
pub mod notifications;
pub mod receipts;
pub mod room_directory;
