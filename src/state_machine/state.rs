//! Session state types

use serde::Serialize;

/// Whether a reply request is outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    /// Exactly one request is in flight; further submits are dropped
    Sending,
}

impl SessionState {
    #[must_use]
    pub fn is_busy(self) -> bool {
        matches!(self, SessionState::Sending)
    }
}
