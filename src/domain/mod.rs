//! Domain layer: chat entities and pure state rules.

pub mod dedup;
pub mod events;
pub mod feed_state;
pub mod ids;
pub mod message;
pub mod notice;
pub mod room;
pub mod room_list_state;
