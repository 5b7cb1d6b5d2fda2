//! Test doubles for the channel ports.

use std::collections::VecDeque;

use async_trait::async_trait;

use super::adapter::{ChannelError, CommandSink, EventStream};
use crate::domain::events::{ChannelEvent, ClientCommand};

/// Records every emitted command for assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub sent: Vec<ClientCommand>,
}

impl CommandSink for RecordingSink {
    fn emit(&mut self, command: ClientCommand) -> Result<(), ChannelError> {
        self.sent.push(command);
        Ok(())
    }
}

/// Replays a fixed script of events, then reports the channel as closed.
pub struct ScriptedStream {
    events: VecDeque<Result<ChannelEvent, ChannelError>>,
    pending_forever: bool,
}

impl ScriptedStream {
    pub fn new(events: Vec<Result<ChannelEvent, ChannelError>>) -> Self {
        Self {
            events: events.into(),
            pending_forever: false,
        }
    }

    /// A stream that never yields, for stop-signal tests.
    pub fn pending_forever() -> Self {
        Self {
            events: VecDeque::new(),
            pending_forever: true,
        }
    }
}

#[async_trait]
impl EventStream for ScriptedStream {
    async fn next_event(&mut self) -> Result<ChannelEvent, ChannelError> {
        if self.pending_forever {
            std::future::pending::<()>().await;
        }

        self.events.pop_front().unwrap_or(Err(ChannelError::Closed))
    }
}
