//! Completion gateway port
//!
//! Defines the interface for obtaining a streamed assistant reply, either
//! from a remote completion endpoint or from the offline generator.

use async_trait::async_trait;
use parley_domain::{ArticleCard, ChatMessage, ErrorInfo, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Errors that can occur while requesting a completion
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompletionError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{message}")]
    RequestFailed { status: u16, message: String },

    #[error("The completion endpoint returned an empty response")]
    EmptyResponse,

    #[error("Request cancelled")]
    Cancelled,

    #[error("{0}")]
    Stream(ErrorInfo),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl CompletionError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CompletionError::Cancelled)
    }

    /// Machine-readable code attached to message-level errors
    pub fn code(&self) -> &'static str {
        match self {
            CompletionError::InvalidRequest(_) => "INVALID_REQUEST",
            CompletionError::RequestFailed { .. } => "REQUEST_FAILED",
            CompletionError::EmptyResponse => "EMPTY_RESPONSE",
            CompletionError::Cancelled => "CANCELLED",
            CompletionError::Stream(_) | CompletionError::Unknown(_) => "UNKNOWN",
        }
    }

    /// Convert into the detail stored on a failed message.
    pub fn to_error_info(&self) -> ErrorInfo {
        match self {
            CompletionError::Stream(info) => info.clone(),
            other => ErrorInfo::new(other.to_string()).with_code(other.code()),
        }
    }
}

/// Callbacks fired while a reply streams in.
///
/// For a given stream, `on_chunk` fires zero or more times and then exactly
/// one of `on_complete` / `on_error` fires, unless the stream is cancelled,
/// in which case neither does.
pub trait StreamObserver: Send + Sync {
    /// Called with the new text since the last chunk and the text so far
    fn on_chunk(&self, _delta: &str, _cumulative: &str) {}

    /// Called when the reply turns out to be an article card
    fn on_card_started(&self) {}

    /// Called with the card payload once it is ready
    fn on_card(&self, _card: &ArticleCard) {}

    /// Called once with the final text
    fn on_complete(&self, _text: &str) {}

    /// Called once when the reply fails
    fn on_error(&self, _error: &ErrorInfo) {}
}

/// Observer that ignores every callback
pub struct NoStreamObserver;

impl StreamObserver for NoStreamObserver {}

/// Handle for an in-flight streamed reply.
///
/// Wraps the event receiver together with the cancellation token the
/// producer watches, so the holder can both consume the result and abort
/// the request.
pub struct StreamHandle {
    receiver: mpsc::Receiver<StreamEvent>,
    cancellation: CancellationToken,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>, cancellation: CancellationToken) -> Self {
        Self {
            receiver,
            cancellation,
        }
    }

    /// Abort the underlying request. Events already queued are discarded by
    /// [`drive`](Self::drive).
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Receive the next event, or `None` once the producer is done.
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }

    /// Consume the stream, forwarding events to `observer`, and return the
    /// final text.
    pub async fn drive(mut self, observer: &dyn StreamObserver) -> Result<String, CompletionError> {
        let mut cumulative = String::new();
        loop {
            let event = tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => return Err(CompletionError::Cancelled),
                event = self.receiver.recv() => event,
            };

            match event {
                Some(StreamEvent::Delta {
                    delta,
                    cumulative: text,
                }) => {
                    observer.on_chunk(&delta, &text);
                    cumulative = text;
                }
                Some(StreamEvent::Completed(text)) => {
                    observer.on_complete(&text);
                    return Ok(text);
                }
                Some(StreamEvent::Error(info)) => {
                    observer.on_error(&info);
                    return Err(CompletionError::Stream(info));
                }
                Some(StreamEvent::CardStarted) => observer.on_card_started(),
                Some(StreamEvent::CardReady(card)) => observer.on_card(&card),
                None => {
                    // Producer went away without a terminal event
                    if self.cancellation.is_cancelled() {
                        return Err(CompletionError::Cancelled);
                    }
                    observer.on_complete(&cumulative);
                    return Ok(cumulative);
                }
            }
        }
    }

    /// Consume the stream and collect the final text, ignoring progress.
    pub async fn collect_text(self) -> Result<String, CompletionError> {
        self.drive(&NoStreamObserver).await
    }
}

/// Source of streamed assistant replies
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Start a reply for `history`. The request is bound to `cancellation`:
    /// once it fires, the producer stops emitting events.
    async fn open_stream(
        &self,
        history: &[ChatMessage],
        cancellation: CancellationToken,
    ) -> Result<StreamHandle, CompletionError>;

    /// Request a reply and stream it through `observer`, returning the
    /// final text.
    async fn send(
        &self,
        history: &[ChatMessage],
        observer: &dyn StreamObserver,
        cancellation: CancellationToken,
    ) -> Result<String, CompletionError> {
        if history.is_empty() {
            return Err(CompletionError::InvalidRequest(
                "message history is empty".to_string(),
            ));
        }
        let handle = self.open_stream(history, cancellation).await?;
        handle.drive(observer).await
    }
}
