//! Per-session conversation state and the history-clear flow.

use serde::Serialize;
use tracing::debug;

use crate::types::ChatEntry;

/// Two-step confirm/cancel gate in front of clearing the history.
///
/// Stays `PendingConfirm` until confirmed or cancelled; there is no timeout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearFlow {
    #[default]
    Idle,
    PendingConfirm,
}

/// Everything the router knows about one conversation.
///
/// `history` is append-only apart from an explicit clear. `last_city` is the
/// most recently established city of interest and the only anaphora
/// mechanism: it survives turns until overwritten or cleared.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationState {
    pub history: Vec<ChatEntry>,
    pub last_city: Option<String>,
    clear_flow: ClearFlow,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ChatEntry) {
        self.history.push(entry);
    }

    pub fn last_city(&self) -> Option<&str> {
        self.last_city.as_deref()
    }

    /// Record a city established from an explicit source.
    pub fn set_last_city(&mut self, city: impl Into<String>) {
        let city = city.into();
        debug!(city = %city, "last city updated");
        self.last_city = Some(city);
    }

    pub fn clear_flow(&self) -> ClearFlow {
        self.clear_flow
    }

    pub fn is_clear_pending(&self) -> bool {
        self.clear_flow == ClearFlow::PendingConfirm
    }

    /// `Idle -> PendingConfirm`. Repeating the request is harmless.
    pub fn request_clear(&mut self) {
        self.clear_flow = ClearFlow::PendingConfirm;
    }

    /// Confirm a pending clear: empties the history and forgets the last
    /// city. Returns `false` and changes nothing when no clear is pending.
    pub fn confirm_clear(&mut self) -> bool {
        if !self.is_clear_pending() {
            return false;
        }
        self.history.clear();
        self.last_city = None;
        self.clear_flow = ClearFlow::Idle;
        true
    }

    /// Cancel a pending clear; the history is left untouched.
    pub fn cancel_clear(&mut self) {
        self.clear_flow = ClearFlow::Idle;
    }

    /// `User` and `Bot` texts in order, skipping tables.
    pub fn text_entries(&self) -> impl Iterator<Item = &ChatEntry> {
        self.history
            .iter()
            .filter(|e| !matches!(e, ChatEntry::Table(_)))
    }
}
