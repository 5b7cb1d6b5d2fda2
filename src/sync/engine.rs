use std::time::Instant;

use anyhow::Result;

use crate::channel::adapter::CommandSink;
use crate::domain::events::{ChannelEvent, ClientCommand, ConnectionStatus, ServerEvent};
use crate::domain::feed_state::{FeedState, ScrollAnchor, ScrollCommand};
use crate::domain::ids::UserId;
use crate::domain::message::MessageKind;
use crate::domain::notice::Notice;
use crate::domain::room::Room;
use crate::infra::config::SyncConfig;

use super::message_feed::MessageFeed;
use super::notifications::NoticeRelay;
use super::room_directory::RoomDirectory;

const ENGINE_SEND_WITHOUT_ACTIVE_ROOM: &str = "ENGINE_SEND_WITHOUT_ACTIVE_ROOM";
const FEED_PAGE_FOR_UNLISTED_ROOM: &str = "FEED_PAGE_FOR_UNLISTED_ROOM";

/// Routes channel events to the room directory, the active feed, and the
/// notice relay, and exposes the user-initiated operations.
///
/// The engine is synchronous and single-threaded: each handler runs to
/// completion before the next event is processed, so the components never
/// see interleaved mutation. Time is injected through `now` arguments;
/// callers drive debounce and notice expiry via [`handle_tick`].
///
/// [`handle_tick`]: SyncEngine::handle_tick
pub struct SyncEngine<S: CommandSink> {
    sink: S,
    connection: ConnectionStatus,
    directory: RoomDirectory,
    feed: MessageFeed,
    relay: NoticeRelay,
}

impl<S: CommandSink> SyncEngine<S> {
    pub fn new(local_user: UserId, config: &SyncConfig, sink: S) -> Self {
        Self {
            sink,
            connection: ConnectionStatus::default(),
            directory: RoomDirectory::new(config.room_update_debounce()),
            feed: MessageFeed::new(local_user, config.page_size, config.duplicate_window_ms),
            relay: NoticeRelay::new(config.notice_ttl()),
        }
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.connection
    }

    pub fn rooms(&self) -> &[Room] {
        self.directory.rooms()
    }

    pub fn feed(&self) -> &FeedState {
        self.feed.state()
    }

    pub fn notices(&self) -> Vec<&Notice> {
        self.relay.active()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Applies one channel event. Degraded paths (stale responses, foreign
    /// rooms, duplicates) resolve to logged no-ops; only sink failures
    /// surface as errors.
    pub fn handle_event(&mut self, event: ChannelEvent, now: Instant) -> Result<()> {
        match event {
            ChannelEvent::Connected => {
                self.connection = ConnectionStatus::Connected;
            }
            ChannelEvent::Disconnected => {
                self.connection = ConnectionStatus::Disconnected;
            }
            ChannelEvent::Server(server_event) => {
                self.handle_server_event(server_event, now)?;
            }
        }
        Ok(())
    }

    fn handle_server_event(&mut self, event: ServerEvent, now: Instant) -> Result<()> {
        match event {
            ServerEvent::RoomSnapshot(rooms) => self.directory.apply_snapshot(rooms),
            ServerEvent::RoomCreated(room) => self.directory.on_room_created(room),
            ServerEvent::RoomUpdated(room) => self.directory.on_room_updated(room, now),
            ServerEvent::MessagePage {
                room_id,
                messages,
                is_new_room,
            } => {
                if is_new_room && self.directory.get(&room_id).is_none() {
                    // Upstream behavior is undefined here; surface it
                    // rather than fabricating a directory entry. The
                    // directory converges when the server's own room
                    // events arrive.
                    tracing::warn!(
                        code = FEED_PAGE_FOR_UNLISTED_ROOM,
                        room_id = %room_id,
                        "history page flags a new room the directory does not know"
                    );
                }
                self.feed.on_message_page(&room_id, messages, &mut self.sink)?;
            }
            ServerEvent::NewMessage(message) => {
                self.feed.on_new_message(message, &mut self.sink)?;
            }
            ServerEvent::MessagesSeen { room_id, user_id } => {
                self.feed.on_messages_seen(&room_id, &user_id);
            }
            ServerEvent::SystemNotification(status) => {
                self.relay.on_system_notification(&status, now);
            }
        }
        Ok(())
    }

    /// Settles expired debounce windows and notice ttls. Directory updates
    /// that concern the active room refresh the feed's header from the same
    /// payload.
    pub fn handle_tick(&mut self, now: Instant) {
        for room in self.directory.drain_due(now) {
            self.feed.refresh_room(&room);
        }
        self.relay.drain_expired(now);
    }

    /// Earliest instant at which [`handle_tick`] has work to do.
    ///
    /// [`handle_tick`]: SyncEngine::handle_tick
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.directory.next_deadline(), self.relay.next_deadline()) {
            (Some(directory), Some(relay)) => Some(directory.min(relay)),
            (directory, relay) => directory.or(relay),
        }
    }

    pub fn request_room_list(&mut self) -> Result<()> {
        self.sink.emit(ClientCommand::RequestRoomList)?;
        Ok(())
    }

    pub fn open_room(&mut self, room: Room) -> Result<()> {
        self.feed.switch_room(room, &mut self.sink)?;
        Ok(())
    }

    /// Sends a message to the active room. Without an active room this is a
    /// logged no-op; the UI should not offer a composer in that state.
    pub fn send_message(
        &mut self,
        kind: MessageKind,
        content: impl Into<String>,
        file_name: Option<String>,
        system_meta: Option<serde_json::Value>,
    ) -> Result<()> {
        let Some(room_id) = self.feed.state().room_id().cloned() else {
            tracing::warn!(
                code = ENGINE_SEND_WITHOUT_ACTIVE_ROOM,
                "dropping send request: no active room"
            );
            return Ok(());
        };

        self.sink.emit(ClientCommand::SendMessage {
            room_id,
            kind,
            content: content.into(),
            file_name,
            system_meta,
        })?;
        Ok(())
    }

    pub fn on_scroll_near_top(&mut self, anchor: ScrollAnchor) -> Result<()> {
        self.feed.on_scroll_near_top(anchor, &mut self.sink)?;
        Ok(())
    }

    pub fn set_viewer_near_bottom(&mut self, near_bottom: bool) {
        self.feed.set_viewer_near_bottom(near_bottom);
    }

    pub fn take_scroll_command(&mut self) -> Option<ScrollCommand> {
        self.feed.take_scroll_command()
    }

    pub fn dismiss_notice(&mut self, id: u64) -> bool {
        self.relay.dismiss(id)
    }

    /// Teardown: drains pending debounce timers and active notices so
    /// nothing fires against a dismantled view.
    pub fn teardown(&mut self) {
        self.directory.clear_pending();
        self.relay.clear();
        self.feed.clear();
    }
}
