//! Streaming events for a single assistant turn.
//!
//! [`StreamEvent`] bridges whatever produces a reply (the HTTP streaming
//! client or the offline generator) and the application layer that applies
//! it to the session store. A well-formed stream carries any number of
//! non-terminal events followed by exactly one terminal event. A cancelled
//! stream simply ends without a terminal event.

use super::entities::{ArticleCard, ErrorInfo};

/// An event in a streaming assistant reply
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// New text since the previous delta, plus everything received so far
    Delta { delta: String, cumulative: String },
    /// The reply will carry an article card (the message becomes `card`-typed)
    CardStarted,
    /// The card payload for a `card`-typed reply
    CardReady(ArticleCard),
    /// The complete reply text (signals stream end)
    Completed(String),
    /// A failure while producing the reply (signals stream end)
    Error(ErrorInfo),
}

impl StreamEvent {
    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed(_) | StreamEvent::Error(_))
    }
}
