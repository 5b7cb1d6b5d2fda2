use crate::channel::adapter::{ChannelError, CommandSink};
use crate::domain::events::ClientCommand;
use crate::domain::feed_state::{FeedPhase, FeedState, ScrollAnchor, ScrollCommand};
use crate::domain::ids::{RoomId, UserId};
use crate::domain::message::Message;
use crate::domain::room::Room;

use super::receipts;

const FEED_STALE_PAGE_DISCARDED: &str = "FEED_STALE_PAGE_DISCARDED";
const FEED_UNEXPECTED_PAGE_DISCARDED: &str = "FEED_UNEXPECTED_PAGE_DISCARDED";
const FEED_FOREIGN_MESSAGE_DISCARDED: &str = "FEED_FOREIGN_MESSAGE_DISCARDED";
const FEED_DUPLICATE_MESSAGE_DROPPED: &str = "FEED_DUPLICATE_MESSAGE_DROPPED";
const FEED_SEEN_FOR_UNLOADED_ROOM: &str = "FEED_SEEN_FOR_UNLOADED_ROOM";

/// Workflow around the active room's message window.
///
/// Owns room switching, history pagination, live message arrival, and the
/// seen-receipt signals those emit. Responses that arrive for a room that is
/// no longer active are discarded by identity check; there is no in-flight
/// request cancellation.
#[derive(Debug)]
pub struct MessageFeed {
    state: FeedState,
    local_user: UserId,
    page_size: u32,
    duplicate_window_ms: i64,
}

impl MessageFeed {
    pub fn new(local_user: UserId, page_size: u32, duplicate_window_ms: i64) -> Self {
        Self {
            state: FeedState::default(),
            local_user,
            page_size,
            duplicate_window_ms,
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    /// Makes `room` the active room, discarding the previous window, and
    /// requests its first history page. Re-opening the already active room
    /// is a no-op.
    pub fn switch_room<S: CommandSink>(
        &mut self,
        room: Room,
        sink: &mut S,
    ) -> Result<(), ChannelError> {
        if self.state.is_active(&room.id) {
            return Ok(());
        }

        let room_id = room.id.clone();
        let counterpart = room.other_participant.id.clone();
        self.state.reset_for(room);

        sink.emit(ClientCommand::JoinRoom { room_id })?;
        sink.emit(ClientCommand::RequestMessagePage {
            other_user_id: counterpart,
            page: 1,
            size: self.page_size,
        })
    }

    /// Applies a history page for `room_id`. The first page replaces the
    /// window; later pages prepend. Any applied page acknowledges the room
    /// as seen.
    pub fn on_message_page<S: CommandSink>(
        &mut self,
        room_id: &RoomId,
        messages: Vec<Message>,
        sink: &mut S,
    ) -> Result<(), ChannelError> {
        if !self.state.is_active(room_id) {
            tracing::debug!(
                code = FEED_STALE_PAGE_DISCARDED,
                room_id = %room_id,
                "discarding page for a room that is no longer active"
            );
            return Ok(());
        }

        match self.state.phase() {
            FeedPhase::LoadingInitial => self.state.apply_initial_page(messages, self.page_size),
            FeedPhase::LoadingOlder => self.state.apply_older_page(messages, self.page_size),
            phase => {
                // No request is outstanding; a re-delivered page would
                // corrupt the window if applied.
                tracing::debug!(
                    code = FEED_UNEXPECTED_PAGE_DISCARDED,
                    room_id = %room_id,
                    phase = ?phase,
                    "discarding page with no outstanding request"
                );
                return Ok(());
            }
        }

        sink.emit(ClientCommand::MarkSeen {
            room_id: room_id.clone(),
        })
    }

    /// Appends a live message to the active room's window. Messages for
    /// other rooms and re-deliveries are dropped; a counterpart message that
    /// is not a status notice acknowledges the room as seen.
    pub fn on_new_message<S: CommandSink>(
        &mut self,
        message: Message,
        sink: &mut S,
    ) -> Result<(), ChannelError> {
        if !self.state.is_active(&message.room_id) {
            tracing::debug!(
                code = FEED_FOREIGN_MESSAGE_DISCARDED,
                room_id = %message.room_id,
                "discarding live message for an inactive room"
            );
            return Ok(());
        }

        let from_local = message.is_from(&self.local_user);
        let wants_ack = !from_local && !message.kind.is_status_notice();
        let room_id = message.room_id.clone();
        let message_id = message.id.clone();

        if !self
            .state
            .append_live(message, self.duplicate_window_ms, from_local)
        {
            tracing::debug!(
                code = FEED_DUPLICATE_MESSAGE_DROPPED,
                message_id = %message_id,
                "dropping re-delivered message"
            );
            return Ok(());
        }

        if wants_ack {
            sink.emit(ClientCommand::MarkSeen { room_id })?;
        }
        Ok(())
    }

    /// The viewer scrolled near the top: requests the next backward page if
    /// one may be outstanding, capturing the scroll anchor first.
    pub fn on_scroll_near_top<S: CommandSink>(
        &mut self,
        anchor: ScrollAnchor,
        sink: &mut S,
    ) -> Result<(), ChannelError> {
        if !self.state.can_fetch_older() {
            return Ok(());
        }
        let Some(counterpart) = self
            .state
            .room()
            .map(|room| room.other_participant.id.clone())
        else {
            return Ok(());
        };

        let page = self.state.begin_older_fetch(anchor);
        sink.emit(ClientCommand::RequestMessagePage {
            other_user_id: counterpart,
            page,
            size: self.page_size,
        })
    }

    /// `user_id` saw the messages of `room_id`. Only the loaded window is
    /// patched; receipts for other rooms are dropped without effect.
    pub fn on_messages_seen(&mut self, room_id: &RoomId, user_id: &UserId) {
        if !self.state.is_active(room_id) {
            tracing::debug!(
                code = FEED_SEEN_FOR_UNLOADED_ROOM,
                room_id = %room_id,
                "ignoring seen receipt for a room that is not loaded"
            );
            return;
        }

        receipts::apply_seen(self.state.messages_mut(), user_id);
    }

    /// Refreshes the active room's header from a settled directory update.
    pub fn refresh_room(&mut self, room: &Room) {
        self.state.refresh_room(room);
    }

    pub fn set_viewer_near_bottom(&mut self, near_bottom: bool) {
        self.state.set_viewer_near_bottom(near_bottom);
    }

    pub fn take_scroll_command(&mut self) -> Option<ScrollCommand> {
        self.state.take_scroll_command()
    }

    pub fn clear(&mut self) {
        self.state.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::channel::stubs::RecordingSink;
    use crate::domain::ids::MessageId;
    use crate::domain::message::MessageKind;
    use crate::domain::room::{LiveStatus, Participant};

    const PAGE_SIZE: u32 = 20;
    const WINDOW_MS: i64 = 1_000;

    fn feed() -> MessageFeed {
        MessageFeed::new(UserId::new("me"), PAGE_SIZE, WINDOW_MS)
    }

    fn room(id: &str, counterpart: &str) -> Room {
        Room {
            id: RoomId::new(id),
            other_participant: Participant {
                id: UserId::new(counterpart),
                display_name: counterpart.to_owned(),
                avatar_ref: None,
                live_status: LiveStatus::Unknown,
            },
            last_message: None,
            unread_count: 0,
            created_at_ms: None,
            updated_at_ms: None,
        }
    }

    fn msg(id: &str, room_id: &str, sender: &str, created_at_ms: i64) -> Message {
        Message {
            id: MessageId::new(id),
            room_id: RoomId::new(room_id),
            sender: UserId::new(sender),
            kind: MessageKind::Text,
            content: format!("msg {id}"),
            media_ref: None,
            created_at_ms,
            seen_by: BTreeSet::new(),
        }
    }

    fn page(room_id: &str, count: usize, start_ms: i64) -> Vec<Message> {
        (0..count)
            .map(|i| {
                msg(
                    &format!("m{}", start_ms + i as i64),
                    room_id,
                    "seller",
                    start_ms + i as i64,
                )
            })
            .collect()
    }

    #[test]
    fn switching_rooms_joins_and_requests_page_one() {
        let mut feed = feed();
        let mut sink = RecordingSink::default();

        feed.switch_room(room("r1", "seller"), &mut sink)
            .expect("switch must emit");

        assert_eq!(
            sink.sent,
            vec![
                ClientCommand::JoinRoom {
                    room_id: RoomId::new("r1")
                },
                ClientCommand::RequestMessagePage {
                    other_user_id: UserId::new("seller"),
                    page: 1,
                    size: PAGE_SIZE,
                },
            ]
        );
        assert_eq!(feed.state().phase(), FeedPhase::LoadingInitial);
    }

    #[test]
    fn reopening_the_active_room_is_a_noop() {
        let mut feed = feed();
        let mut sink = RecordingSink::default();
        feed.switch_room(room("r1", "seller"), &mut sink)
            .expect("switch must emit");
        sink.sent.clear();

        feed.switch_room(room("r1", "seller"), &mut sink)
            .expect("reopen must not fail");

        assert!(sink.sent.is_empty());
    }

    #[test]
    fn initial_page_fills_the_window_and_acknowledges_seen() {
        let mut feed = feed();
        let mut sink = RecordingSink::default();
        feed.switch_room(room("r1", "seller"), &mut sink)
            .expect("switch must emit");
        sink.sent.clear();

        feed.on_message_page(&RoomId::new("r1"), page("r1", 20, 100), &mut sink)
            .expect("page must apply");

        assert_eq!(feed.state().messages().len(), 20);
        assert_eq!(feed.state().phase(), FeedPhase::Ready);
        assert_eq!(
            sink.sent,
            vec![ClientCommand::MarkSeen {
                room_id: RoomId::new("r1")
            }]
        );
    }

    #[test]
    fn page_for_an_inactive_room_is_discarded() {
        let mut feed = feed();
        let mut sink = RecordingSink::default();
        feed.switch_room(room("r1", "seller"), &mut sink)
            .expect("switch must emit");
        feed.switch_room(room("r2", "vendor"), &mut sink)
            .expect("switch must emit");
        sink.sent.clear();

        feed.on_message_page(&RoomId::new("r1"), page("r1", 20, 100), &mut sink)
            .expect("stale page must be dropped quietly");

        assert!(feed.state().messages().is_empty());
        assert!(sink.sent.is_empty());
    }

    #[test]
    fn switching_away_and_back_reloads_from_page_one() {
        let mut feed = feed();
        let mut sink = RecordingSink::default();
        feed.switch_room(room("a", "seller"), &mut sink)
            .expect("switch must emit");
        feed.on_message_page(&RoomId::new("a"), page("a", 20, 100), &mut sink)
            .expect("page must apply");

        feed.switch_room(room("b", "vendor"), &mut sink)
            .expect("switch must emit");
        feed.on_message_page(&RoomId::new("b"), page("b", 5, 900), &mut sink)
            .expect("page must apply");

        sink.sent.clear();
        feed.switch_room(room("a", "seller"), &mut sink)
            .expect("switch must emit");

        assert!(feed.state().messages().is_empty(), "no cross-room bleed");
        assert_eq!(feed.state().page(), 1);
        assert_eq!(
            sink.sent[1],
            ClientCommand::RequestMessagePage {
                other_user_id: UserId::new("seller"),
                page: 1,
                size: PAGE_SIZE,
            }
        );
    }

    #[test]
    fn scroll_near_top_requests_the_next_page_once() {
        let mut feed = feed();
        let mut sink = RecordingSink::default();
        feed.switch_room(room("r1", "seller"), &mut sink)
            .expect("switch must emit");
        feed.on_message_page(&RoomId::new("r1"), page("r1", 20, 1_000), &mut sink)
            .expect("page must apply");
        sink.sent.clear();

        feed.on_scroll_near_top(ScrollAnchor::from_bottom(480), &mut sink)
            .expect("scroll must request");
        // Still loading: a second scroll must not fire another request.
        feed.on_scroll_near_top(ScrollAnchor::from_bottom(480), &mut sink)
            .expect("scroll during load is a no-op");

        assert_eq!(
            sink.sent,
            vec![ClientCommand::RequestMessagePage {
                other_user_id: UserId::new("seller"),
                page: 2,
                size: PAGE_SIZE,
            }]
        );
    }

    #[test]
    fn short_second_page_exhausts_pagination() {
        let mut feed = feed();
        let mut sink = RecordingSink::default();
        feed.switch_room(room("r1", "seller"), &mut sink)
            .expect("switch must emit");
        feed.on_message_page(&RoomId::new("r1"), page("r1", 20, 1_000), &mut sink)
            .expect("page must apply");
        feed.on_scroll_near_top(ScrollAnchor::from_bottom(480), &mut sink)
            .expect("scroll must request");
        feed.on_message_page(&RoomId::new("r1"), page("r1", 7, 100), &mut sink)
            .expect("page must apply");
        sink.sent.clear();

        assert_eq!(feed.state().phase(), FeedPhase::Exhausted);

        feed.on_scroll_near_top(ScrollAnchor::from_bottom(480), &mut sink)
            .expect("scroll after exhaustion is a no-op");

        assert!(sink.sent.is_empty());
    }

    #[test]
    fn server_echo_of_an_existing_id_is_dropped() {
        let mut feed = feed();
        let mut sink = RecordingSink::default();
        feed.switch_room(room("r1", "seller"), &mut sink)
            .expect("switch must emit");
        feed.on_message_page(&RoomId::new("r1"), vec![], &mut sink)
            .expect("page must apply");
        sink.sent.clear();

        let mine = msg("m1", "r1", "me", 10_000);
        feed.on_new_message(mine.clone(), &mut sink)
            .expect("first delivery appends");

        let mut echo = mine;
        echo.created_at_ms += 300;
        feed.on_new_message(echo, &mut sink)
            .expect("echo must be dropped quietly");

        assert_eq!(feed.state().messages().len(), 1);
        assert!(sink.sent.is_empty(), "own messages never acknowledge seen");
    }

    #[test]
    fn counterpart_message_acknowledges_seen() {
        let mut feed = feed();
        let mut sink = RecordingSink::default();
        feed.switch_room(room("r1", "seller"), &mut sink)
            .expect("switch must emit");
        feed.on_message_page(&RoomId::new("r1"), vec![], &mut sink)
            .expect("page must apply");
        sink.sent.clear();

        feed.on_new_message(msg("m1", "r1", "seller", 10_000), &mut sink)
            .expect("message appends");

        assert_eq!(
            sink.sent,
            vec![ClientCommand::MarkSeen {
                room_id: RoomId::new("r1")
            }]
        );
    }

    #[test]
    fn status_notices_do_not_acknowledge_seen() {
        let mut feed = feed();
        let mut sink = RecordingSink::default();
        feed.switch_room(room("r1", "seller"), &mut sink)
            .expect("switch must emit");
        feed.on_message_page(&RoomId::new("r1"), vec![], &mut sink)
            .expect("page must apply");
        sink.sent.clear();

        let mut notice = msg("m1", "r1", "seller", 10_000);
        notice.kind = MessageKind::OrderStatus;
        feed.on_new_message(notice, &mut sink)
            .expect("notice appends");

        assert_eq!(feed.state().messages().len(), 1);
        assert!(sink.sent.is_empty());
    }

    #[test]
    fn message_for_another_room_is_discarded() {
        let mut feed = feed();
        let mut sink = RecordingSink::default();
        feed.switch_room(room("r1", "seller"), &mut sink)
            .expect("switch must emit");
        feed.on_message_page(&RoomId::new("r1"), vec![], &mut sink)
            .expect("page must apply");
        sink.sent.clear();

        feed.on_new_message(msg("m1", "r2", "seller", 10_000), &mut sink)
            .expect("foreign message must be dropped quietly");

        assert!(feed.state().messages().is_empty());
        assert!(sink.sent.is_empty());
    }

    #[test]
    fn seen_receipt_patches_only_the_active_room() {
        let mut feed = feed();
        let mut sink = RecordingSink::default();
        feed.switch_room(room("r1", "seller"), &mut sink)
            .expect("switch must emit");
        feed.on_message_page(
            &RoomId::new("r1"),
            vec![msg("m1", "r1", "me", 100), msg("m2", "r1", "seller", 200)],
            &mut sink,
        )
        .expect("page must apply");

        feed.on_messages_seen(&RoomId::new("r2"), &UserId::new("seller"));
        assert!(feed.state().messages()[0].seen_by.is_empty());

        feed.on_messages_seen(&RoomId::new("r1"), &UserId::new("seller"));
        feed.on_messages_seen(&RoomId::new("r1"), &UserId::new("seller"));

        let messages = feed.state().messages();
        assert!(messages[0].seen_by.contains(&UserId::new("seller")));
        assert!(
            messages[1].seen_by.is_empty(),
            "sender's own messages are not patched"
        );
    }

    #[test]
    fn redelivered_page_without_an_outstanding_request_is_discarded() {
        let mut feed = feed();
        let mut sink = RecordingSink::default();
        feed.switch_room(room("r1", "seller"), &mut sink)
            .expect("switch must emit");
        feed.on_message_page(&RoomId::new("r1"), page("r1", 20, 100), &mut sink)
            .expect("page must apply");
        sink.sent.clear();

        feed.on_message_page(&RoomId::new("r1"), page("r1", 20, 100), &mut sink)
            .expect("re-delivery must be dropped quietly");

        assert_eq!(feed.state().messages().len(), 20);
        assert!(sink.sent.is_empty());
    }
}
