//! Events that can occur in a session

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // User events
    /// Raw input, not yet trimmed
    Submit { text: String },
    Reset,

    // Backend events
    ReplyReceived { text: String },
    /// Already normalized for display
    ReplyFailed { error: String },
}
