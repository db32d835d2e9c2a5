//! Turn progress notification port
//!
//! Defines the interface for rendering a turn while the orchestrator owns
//! the state updates.

use parley_domain::{ArticleCard, ErrorInfo};

/// Callback for progress updates during a conversation turn
///
/// Implementations live in the presentation layer.
pub trait TurnProgressNotifier: Send + Sync {
    /// Called once the placeholder message exists and the request is issued
    fn on_turn_start(&self, _message_id: &str) {}

    /// Called for each text delta applied to the target message
    fn on_chunk(&self, _delta: &str, _cumulative: &str) {}

    /// Called when a card payload is attached to the target message
    fn on_card(&self, _card: &ArticleCard) {}

    /// Called when the reply completed
    fn on_turn_complete(&self, _text: &str) {}

    /// Called when the reply failed
    fn on_turn_error(&self, _error: &ErrorInfo) {}

    /// Called when the turn was stopped or superseded
    fn on_turn_cancelled(&self) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoTurnProgress;

impl TurnProgressNotifier for NoTurnProgress {}
