//! Stream Decoder: byte stream in, [`StreamEvent`]s out.
//!
//! ```text
//! chunks ──▶ LineBuffer ──▶ parse_frame ──▶ Throttle ──▶ Delta events
//!                                 │
//!                                 └── [DONE] / end of body ──▶ Completed
//! ```
//!
//! Exactly one terminal event (`Completed` or `Error`) is sent per stream,
//! unless the stream is cancelled, in which case nothing further is sent.
//! Text still held by the throttle goes out as one last `Delta` right before
//! the terminal event, so the deltas always add up to the final text.

use super::frame::{Frame, parse_frame};
use super::lines::LineBuffer;
use super::throttle::Throttle;
use futures::{Stream, StreamExt};
use parley_application::CompletionError;
use parley_domain::StreamEvent;
use std::fmt::Display;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Decode a completion response body and forward its events to `events`.
///
/// Returns the final text, `Err(Cancelled)` when `cancellation` fires or the
/// receiver goes away, and the read failure otherwise.
pub async fn decode_body<S, B, E>(
    body: S,
    events: mpsc::Sender<StreamEvent>,
    cancellation: CancellationToken,
    min_interval: Duration,
) -> Result<String, CompletionError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    tokio::pin!(body);
    let mut lines = LineBuffer::new();
    let mut throttle = Throttle::new(min_interval);
    let mut cumulative = String::new();

    loop {
        let next = tokio::select! {
            biased;
            _ = cancellation.cancelled() => {
                debug!("Stream cancelled after {} bytes", cumulative.len());
                return Err(CompletionError::Cancelled);
            }
            next = body.next() => next,
        };

        let (batch, at_end) = match next {
            Some(Ok(chunk)) => (lines.push(chunk.as_ref()), false),
            Some(Err(e)) => {
                let error = CompletionError::Unknown(format!("Failed to read response stream: {e}"));
                warn!("{}", error);
                flush(&events, &mut throttle, &cumulative).await?;
                send(&events, StreamEvent::Error(error.to_error_info())).await?;
                return Err(error);
            }
            None => (lines.finish().into_iter().collect(), true),
        };

        for line in batch {
            match parse_frame(&line) {
                Ok(Frame::Done) => return complete(&events, &mut throttle, cumulative).await,
                Ok(Frame::Delta(text)) if !text.is_empty() => {
                    cumulative.push_str(&text);
                    if let Some(delta) = throttle.offer(&text, Instant::now()) {
                        let event = StreamEvent::Delta {
                            delta,
                            cumulative: cumulative.clone(),
                        };
                        send(&events, event).await?;
                    }
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping {}", e),
            }
        }

        if at_end {
            debug!("Response body ended without a terminal frame");
            return complete(&events, &mut throttle, cumulative).await;
        }
    }
}

async fn complete(
    events: &mpsc::Sender<StreamEvent>,
    throttle: &mut Throttle,
    text: String,
) -> Result<String, CompletionError> {
    flush(events, throttle, &text).await?;
    debug!("Stream complete ({} bytes)", text.len());
    send(events, StreamEvent::Completed(text.clone())).await?;
    Ok(text)
}

async fn flush(
    events: &mpsc::Sender<StreamEvent>,
    throttle: &mut Throttle,
    cumulative: &str,
) -> Result<(), CompletionError> {
    match throttle.flush() {
        Some(delta) => {
            let event = StreamEvent::Delta {
                delta,
                cumulative: cumulative.to_string(),
            };
            send(events, event).await
        }
        None => Ok(()),
    }
}

async fn send(
    events: &mpsc::Sender<StreamEvent>,
    event: StreamEvent,
) -> Result<(), CompletionError> {
    events.send(event).await.map_err(|_| {
        debug!("Stream receiver dropped");
        CompletionError::Cancelled
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    type Chunk = Result<Vec<u8>, String>;

    fn frame(content: &str) -> String {
        format!(
            "data: {}\n",
            serde_json::json!({ "choices": [{ "delta": { "content": content } }] })
        )
    }

    fn chunks(parts: &[&str]) -> Vec<Chunk> {
        parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect()
    }

    async fn run(body: Vec<Chunk>) -> (Result<String, CompletionError>, Vec<StreamEvent>) {
        let (tx, mut rx) = mpsc::channel(64);
        let result = decode_body(
            stream::iter(body),
            tx,
            CancellationToken::new(),
            Duration::from_millis(50),
        )
        .await;
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        (result, events)
    }

    #[tokio::test(start_paused = true)]
    async fn single_frame_then_done() {
        let hi = frame("Hi");
        let (result, events) = run(chunks(&[hi.as_str(), "data: [DONE]\n"])).await;

        assert_eq!(result.unwrap(), "Hi");
        assert_eq!(
            events,
            vec![
                StreamEvent::Delta {
                    delta: "Hi".into(),
                    cumulative: "Hi".into()
                },
                StreamEvent::Completed("Hi".into()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_frame_is_skipped() {
        let a = frame("Hello");
        let b = frame(" world");
        let body = chunks(&[
            a.as_str(),
            "data: {not json}\n",
            b.as_str(),
            "data: [DONE]\n",
        ]);
        let (result, events) = run(body).await;

        assert_eq!(result.unwrap(), "Hello world");
        assert_eq!(events.last(), Some(&StreamEvent::Completed("Hello world".into())));
        let completions = events.iter().filter(|e| e.is_terminal()).count();
        assert_eq!(completions, 1);
    }

    fn deltas(events: &[StreamEvent]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::Delta { delta, .. } => Some(delta.as_str()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn held_tail_is_emitted_before_completion() {
        // Both frames arrive in the same instant, so " there" is held back
        let both = format!("{}{}", frame("Hi"), frame(" there"));
        let (result, events) = run(chunks(&[both.as_str(), "data: [DONE]\n"])).await;

        assert_eq!(result.unwrap(), "Hi there");
        assert_eq!(deltas(&events), vec!["Hi", " there"]);
        assert_eq!(deltas(&events).concat(), "Hi there");
        assert_eq!(
            events[1],
            StreamEvent::Delta {
                delta: " there".into(),
                cumulative: "Hi there".into()
            }
        );
        assert_eq!(events.last(), Some(&StreamEvent::Completed("Hi there".into())));
        assert_eq!(events.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn held_tail_is_emitted_when_body_ends() {
        let body = format!("{}{}{}", frame("a"), frame("b"), frame("c"));
        let (result, events) = run(chunks(&[body.as_str()])).await;

        assert_eq!(result.unwrap(), "abc");
        assert_eq!(deltas(&events), vec!["a", "bc"]);
        assert_eq!(events.last(), Some(&StreamEvent::Completed("abc".into())));
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_frames_each_emit_with_coalesced_delta() {
        let (tx, mut rx) = mpsc::channel(64);
        let body = stream::iter(vec![frame("a"), frame("b"), frame("c"), frame("d")])
            .then(|f| async move {
                tokio::time::sleep(Duration::from_millis(30)).await;
                Ok::<_, String>(f.into_bytes())
            });
        let text = decode_body(body, tx, CancellationToken::new(), Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(text, "abcd");

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        // t=30 emits "a"; t=60 too soon; t=90 emits "bc"; t=120 held until the end
        assert_eq!(deltas(&events), vec!["a", "bc", "d"]);
    }

    #[tokio::test(start_paused = true)]
    async fn frames_split_across_chunks_and_multibyte() {
        let full = frame("héllo");
        let bytes = full.as_bytes();
        // Split inside the two-byte "é"
        let split = full.find('é').unwrap() + 1;
        let body = vec![
            Ok(bytes[..split].to_vec()),
            Ok(bytes[split..].to_vec()),
            Ok(b"data: [DO".to_vec()),
            Ok(b"NE]\n".to_vec()),
        ];
        let (result, _) = run(body).await;
        assert_eq!(result.unwrap(), "héllo");
    }

    #[tokio::test(start_paused = true)]
    async fn end_of_body_without_done_completes() {
        let a = frame("partial");
        let (result, events) = run(chunks(&[a.as_str()])).await;
        assert_eq!(result.unwrap(), "partial");
        assert_eq!(events.last(), Some(&StreamEvent::Completed("partial".into())));
    }

    #[tokio::test(start_paused = true)]
    async fn frames_after_done_are_ignored() {
        let a = frame("a");
        let b = frame("b");
        let (result, events) = run(chunks(&[a.as_str(), "data: [DONE]\n", b.as_str()])).await;
        assert_eq!(result.unwrap(), "a");
        assert_eq!(events.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn read_error_emits_single_error() {
        let a = frame("a");
        let body: Vec<Chunk> = vec![Ok(a.into_bytes()), Err("connection reset".to_string())];
        let (result, events) = run(body).await;

        let err = result.unwrap_err();
        assert!(matches!(err, CompletionError::Unknown(_)));
        let errors: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, StreamEvent::Error(_)))
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            events.last(),
            Some(StreamEvent::Error(info)) if info.message.contains("connection reset")
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_without_terminal_event() {
        let (tx, mut rx) = mpsc::channel(64);
        let token = CancellationToken::new();
        let a = frame("a");
        let body = stream::iter(vec![Ok::<_, String>(a.into_bytes())]).chain(stream::pending());

        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            cancel.cancel();
        });
        let result = decode_body(body, tx, token, Duration::from_millis(50)).await;

        assert!(result.unwrap_err().is_cancelled());
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert!(events.iter().all(|e| !e.is_terminal()));
    }
}
