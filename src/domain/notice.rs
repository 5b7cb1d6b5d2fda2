/// Out-of-band status event kinds the console surfaces as notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEventKind {
    OrderStatus,
    PaymentStatus,
}

/// Free-form detail attached to a status event. Fields are optional because
/// the server omits whichever do not apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusMeta {
    /// Order or payment reference, e.g. "SO-1042".
    pub reference: Option<String>,
    /// New state, e.g. "SHIPPED" or "REFUNDED".
    pub status: Option<String>,
}

/// A decoded `systemNotification` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub kind: StatusEventKind,
    pub meta: StatusMeta,
}

/// A transient user-facing notice derived from a status event. Independent
/// of the room and message model by design of the event contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub title: String,
    pub message: String,
}
