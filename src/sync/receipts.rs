use crate::domain::ids::UserId;
use crate::domain::message::Message;

/// Records that `seer` has viewed every message in the window that they did
/// not send themselves. Returns how many messages actually changed.
///
/// The operation is idempotent and monotonic: `seen_by` sets only grow, and
/// neither the order nor the length of the window is touched. Rooms that are
/// not loaded in memory are simply never passed here; there is no
/// retroactive fetch-and-patch.
pub fn apply_seen(messages: &mut [Message], seer: &UserId) -> usize {
    let mut updated = 0;
    for message in messages.iter_mut() {
        if message.is_from(seer) {
            continue;
        }
        if message.seen_by.insert(seer.clone()) {
            updated += 1;
        }
    }
    updated
}
