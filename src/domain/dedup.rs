use super::message::Message;

/// Decides whether `candidate` is a re-delivery of `existing`.
///
/// The same logical message can arrive once as a direct push and once echoed
/// through another channel, the second time possibly under a different id.
/// Two messages match when their ids are equal, or when content and sender
/// are equal and the timestamps fall within `window_ms` of each other.
pub fn is_duplicate(candidate: &Message, existing: &Message, window_ms: i64) -> bool {
    if existing.id == candidate.id {
        return true;
    }

    existing.sender == candidate.sender
        && existing.content == candidate.content
        && (candidate.created_at_ms - existing.created_at_ms).abs() < window_ms
}
