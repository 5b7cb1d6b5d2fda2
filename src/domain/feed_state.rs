use super::dedup::is_duplicate;
use super::ids::RoomId;
use super::message::Message;
use super::room::Room;

/// Explicit lifecycle of the active room's message window.
///
/// `Exhausted` is terminal for pagination only: live messages still append,
/// but no further backward pages will be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedPhase {
    #[default]
    Empty,
    LoadingInitial,
    Ready,
    LoadingOlder,
    Exhausted,
}

/// Opaque distance from the visual bottom of the feed, captured by the UI
/// before a backward page request and restored once the page lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollAnchor(u64);

impl ScrollAnchor {
    pub fn from_bottom(distance: u64) -> Self {
        Self(distance)
    }

    pub fn distance(&self) -> u64 {
        self.0
    }
}

/// Scroll adjustment the UI must perform after the feed mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollCommand {
    ToBottom { animated: bool },
    Restore(ScrollAnchor),
}

/// In-memory message window for the currently active room.
///
/// Messages are ordered oldest to newest and unique by id. Switching rooms
/// discards the window entirely; there is no cross-room state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedState {
    room: Option<Room>,
    messages: Vec<Message>,
    page: u32,
    phase: FeedPhase,
    viewer_near_bottom: bool,
    saved_anchor: Option<ScrollAnchor>,
    pending_scroll: Option<ScrollCommand>,
}

impl FeedState {
    pub fn room(&self) -> Option<&Room> {
        self.room.as_ref()
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        self.room.as_ref().map(|room| &room.id)
    }

    pub fn is_active(&self, room_id: &RoomId) -> bool {
        self.room_id() == Some(room_id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Mutable access for seen-receipt application. A slice cannot grow or
    /// shrink, so the window's length and order survive any caller.
    pub fn messages_mut(&mut self) -> &mut [Message] {
        &mut self.messages
    }

    pub fn phase(&self) -> FeedPhase {
        self.phase
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Discards the previous room's window and starts loading `room`.
    pub fn reset_for(&mut self, room: Room) {
        self.room = Some(room);
        self.messages.clear();
        self.page = 1;
        self.phase = FeedPhase::LoadingInitial;
        self.viewer_near_bottom = true;
        self.saved_anchor = None;
        self.pending_scroll = None;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Marks the start of a backward page fetch, capturing the caller's
    /// scroll anchor. Returns the page number to request.
    pub fn begin_older_fetch(&mut self, anchor: ScrollAnchor) -> u32 {
        self.phase = FeedPhase::LoadingOlder;
        self.saved_anchor = Some(anchor);
        self.page + 1
    }

    /// Whether a backward page may be requested right now.
    pub fn can_fetch_older(&self) -> bool {
        self.phase == FeedPhase::Ready
    }

    /// Applies the first history page, replacing the window wholesale.
    pub fn apply_initial_page(&mut self, page: Vec<Message>, page_size: u32) {
        let full_page = page.len() >= page_size as usize;
        self.messages = normalize_page(page);
        self.page = 1;
        self.phase = if full_page {
            FeedPhase::Ready
        } else {
            FeedPhase::Exhausted
        };
        self.pending_scroll = Some(ScrollCommand::ToBottom { animated: false });
    }

    /// Prepends an older history page, dropping entries whose id is already
    /// in the window, and schedules the saved anchor restore.
    pub fn apply_older_page(&mut self, page: Vec<Message>, page_size: u32) {
        let full_page = page.len() >= page_size as usize;

        let mut merged = normalize_page(page);
        merged.retain(|candidate| {
            !self
                .messages
                .iter()
                .any(|existing| existing.id == candidate.id)
        });
        merged.append(&mut self.messages);
        self.messages = merged;

        self.page += 1;
        self.phase = if full_page {
            FeedPhase::Ready
        } else {
            FeedPhase::Exhausted
        };
        self.pending_scroll = self.saved_anchor.take().map(ScrollCommand::Restore);
    }

    /// Appends a live message unless it duplicates an existing entry.
    /// Returns false when the message was dropped as a duplicate.
    pub fn append_live(&mut self, message: Message, window_ms: i64, from_local: bool) -> bool {
        let duplicate = self
            .messages
            .iter()
            .any(|existing| is_duplicate(&message, existing, window_ms));
        if duplicate {
            return false;
        }

        self.messages.push(message);
        if from_local || self.viewer_near_bottom {
            self.pending_scroll = Some(ScrollCommand::ToBottom { animated: true });
        }
        true
    }

    pub fn set_viewer_near_bottom(&mut self, near_bottom: bool) {
        self.viewer_near_bottom = near_bottom;
    }

    /// Refreshes the active room's metadata from a directory update with the
    /// same id. Updates for other rooms are ignored.
    pub fn refresh_room(&mut self, room: &Room) {
        if self.is_active(&room.id) {
            self.room = Some(room.clone());
        }
    }

    /// Hands the pending scroll adjustment to the UI exactly once.
    pub fn take_scroll_command(&mut self) -> Option<ScrollCommand> {
        self.pending_scroll.take()
    }
}

/// Orders a history page oldest to newest and collapses duplicate ids to the
/// first occurrence. The sort is stable, so equal timestamps keep the
/// server's relative order.
fn normalize_page(mut page: Vec<Message>) -> Vec<Message> {
    page.sort_by_key(|message| message.created_at_ms);

    let mut seen = std::collections::BTreeSet::new();
    page.retain(|message| seen.insert(message.id.clone()));
    page
}
