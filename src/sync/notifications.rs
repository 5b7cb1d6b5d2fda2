use std::time::{Duration, Instant};

use crate::domain::notice::{Notice, StatusEvent, StatusEventKind};

/// Converts out-of-band status events into transient user-facing notices.
///
/// Fully decoupled from the room and message model: the same underlying
/// event may also arrive as a `roomUpdated`, and that path is handled by the
/// Room Directory alone. Notices auto-expire after a fixed ttl and can be
/// dismissed early by id.
#[derive(Debug)]
pub struct NoticeRelay {
    ttl: Duration,
    next_id: u64,
    active: Vec<ActiveNotice>,
}

#[derive(Debug, Clone)]
struct ActiveNotice {
    notice: Notice,
    expires_at: Instant,
}

impl NoticeRelay {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            next_id: 1,
            active: Vec::new(),
        }
    }

    /// Surfaces a status event as a notice. Returns the notice id.
    pub fn on_system_notification(&mut self, event: &StatusEvent, now: Instant) -> u64 {
        let (title, message) = render(event);
        let id = self.next_id;
        self.next_id += 1;

        self.active.push(ActiveNotice {
            notice: Notice { id, title, message },
            expires_at: now + self.ttl,
        });
        id
    }

    pub fn active(&self) -> Vec<&Notice> {
        self.active.iter().map(|entry| &entry.notice).collect()
    }

    /// Dismisses a notice ahead of its ttl. Unknown ids are no-ops.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.active.len();
        self.active.retain(|entry| entry.notice.id != id);
        self.active.len() != before
    }

    /// Drops every notice whose ttl has elapsed. Driven by engine ticks.
    pub fn drain_expired(&mut self, now: Instant) -> usize {
        let before = self.active.len();
        self.active.retain(|entry| entry.expires_at > now);
        before - self.active.len()
    }

    /// Earliest pending expiry, for scheduling the next tick.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.active.iter().map(|entry| entry.expires_at).min()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}

fn render(event: &StatusEvent) -> (String, String) {
    let noun = match event.kind {
        StatusEventKind::OrderStatus => "Order",
        StatusEventKind::PaymentStatus => "Payment",
    };
    let title = format!("{noun} update");

    let message = match (&event.meta.reference, &event.meta.status) {
        (Some(reference), Some(status)) => format!("{noun} {reference} is now {status}."),
        (None, Some(status)) => format!("{noun} is now {status}."),
        (Some(reference), None) => format!("{noun} {reference} was updated."),
        (None, None) => format!("{noun} status changed."),
    };

    (title, message)
}
