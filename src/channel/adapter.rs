use async_trait::async_trait;
use thiserror::Error;

use crate::domain::events::{ChannelEvent, ClientCommand};

#[derive(Debug, Error)]
pub enum ChannelError {
    /// The transport closed and will produce no further events.
    #[error("channel closed")]
    Closed,
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Outbound port: typed emit over the event channel.
pub trait CommandSink {
    fn emit(&mut self, command: ClientCommand) -> Result<(), ChannelError>;
}

impl<T> CommandSink for &mut T
where
    T: CommandSink + ?Sized,
{
    fn emit(&mut self, command: ClientCommand) -> Result<(), ChannelError> {
        (*self).emit(command)
    }
}

/// Inbound port: the next typed event from the channel, including
/// `Connected`/`Disconnected` lifecycle signals. Implemented by the external
/// transport; reconnection and backoff live behind it.
#[async_trait]
pub trait EventStream: Send {
    async fn next_event(&mut self) -> Result<ChannelEvent, ChannelError>;
}
