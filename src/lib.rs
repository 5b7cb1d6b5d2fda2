//! soukchat: client-side synchronization core for the Souk marketplace chat.
//!
//! The crate keeps a room list, an active-room message feed, seen receipts,
//! and transient status notices consistent against an event-based
//! bidirectional channel with at-least-once delivery. The socket transport
//! and the UI shell are external collaborators reached through the traits in
//! [`channel`].

pub mod channel;
pub mod domain;
pub mod infra;
pub mod sync;

pub use domain::events::{ChannelEvent, ClientCommand, ConnectionStatus, ServerEvent};
pub use infra::config::AppConfig;
pub use sync::engine::SyncEngine;
