//! Turn lifecycle.
//!
//! ```text
//! Idle ──start──▶ AwaitingResponse ──complete/error──▶ Settled
//!                        │
//!                        └──stop/supersede──▶ Cancelled
//! ```

use crate::session::entities::ErrorInfo;

/// State of the most recent turn of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    #[default]
    Idle,
    AwaitingResponse,
    Settled,
    Cancelled,
}

impl TurnState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, TurnState::AwaitingResponse)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TurnState::Idle => "idle",
            TurnState::AwaitingResponse => "awaiting-response",
            TurnState::Settled => "settled",
            TurnState::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for TurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a turn ended, as seen by the caller that started it
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The reply completed; carries the final text
    Completed(String),
    /// The reply failed; the target message now carries this detail
    Failed(ErrorInfo),
    /// The turn was stopped or superseded
    Cancelled,
}

impl TurnOutcome {
    pub fn state(&self) -> TurnState {
        match self {
            TurnOutcome::Completed(_) | TurnOutcome::Failed(_) => TurnState::Settled,
            TurnOutcome::Cancelled => TurnState::Cancelled,
        }
    }
}
