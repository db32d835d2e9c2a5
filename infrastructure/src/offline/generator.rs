//! Offline reply generator.
//!
//! Stands in for the completion endpoint when no API is configured. Each
//! request draws a [`ReplyPlan`] from the seeded random source up front,
//! then a background task plays it back through the same event channel the
//! HTTP client uses.

use super::catalog;
use super::policy::OfflinePolicy;
use async_trait::async_trait;
use parley_application::{CompletionError, CompletionGateway, StreamHandle};
use parley_domain::{ArticleCard, ChatMessage, ErrorInfo, Role, StreamEvent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const EVENT_BUFFER: usize = 64;

/// A reply decided in advance, with every delay already sampled
#[derive(Debug, Clone, PartialEq)]
enum ReplyPlan {
    Failure {
        delay: Duration,
        error: ErrorInfo,
    },
    Card {
        card_delay: Duration,
        guide: Typing,
        settle: Duration,
        card: ArticleCard,
    },
    Text {
        delay: Duration,
        reply: Typing,
    },
}

/// Text streamed one character at a time
#[derive(Debug, Clone, PartialEq)]
struct Typing {
    text: String,
    char_delays: Vec<Duration>,
}

impl Typing {
    fn sample(text: String, policy: &OfflinePolicy, rng: &mut StdRng) -> Self {
        let char_delays = text
            .chars()
            .map(|_| policy.char_delay.sample(&mut *rng))
            .collect();
        Self { text, char_delays }
    }
}

/// Simulated completion source driven by an [`OfflinePolicy`]
pub struct OfflineGateway {
    policy: OfflinePolicy,
    rng: Mutex<StdRng>,
}

impl OfflineGateway {
    pub fn new(policy: OfflinePolicy) -> Self {
        let rng = match policy.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            policy,
            rng: Mutex::new(rng),
        }
    }

    pub fn policy(&self) -> &OfflinePolicy {
        &self.policy
    }

    fn plan(&self, prompt: &str) -> ReplyPlan {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let policy = &self.policy;

        if rng.gen_bool(policy.failure_probability.clamp(0.0, 1.0)) {
            return ReplyPlan::Failure {
                delay: policy.failure_delay.sample(&mut *rng),
                error: catalog::random_error(&mut *rng),
            };
        }

        if rng.gen_bool(policy.card_probability.clamp(0.0, 1.0)) {
            let card =
                catalog::relevant_card(prompt).unwrap_or_else(|| catalog::random_card(&mut *rng));
            let guide = Typing::sample(catalog::guide_text(&card), policy, &mut *rng);
            return ReplyPlan::Card {
                card_delay: policy.card_delay,
                guide,
                settle: policy.card_settle,
                card,
            };
        }

        let text = catalog::random_reply(&mut *rng, prompt);
        ReplyPlan::Text {
            delay: policy.reply_delay.sample(&mut *rng),
            reply: Typing::sample(text, policy, &mut *rng),
        }
    }
}

#[async_trait]
impl CompletionGateway for OfflineGateway {
    async fn open_stream(
        &self,
        history: &[ChatMessage],
        cancellation: CancellationToken,
    ) -> Result<StreamHandle, CompletionError> {
        let prompt = history
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .ok_or_else(|| CompletionError::InvalidRequest("no user message".to_string()))?;

        let plan = self.plan(prompt);
        debug!("Offline reply planned: {}", plan.kind());

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let player = Player {
            events: tx,
            cancellation: cancellation.clone(),
        };
        tokio::spawn(async move {
            if player.play(plan).await.is_none() {
                debug!("Offline reply cancelled");
            }
        });
        Ok(StreamHandle::new(rx, cancellation))
    }
}

impl ReplyPlan {
    fn kind(&self) -> &'static str {
        match self {
            ReplyPlan::Failure { .. } => "failure",
            ReplyPlan::Card { .. } => "card",
            ReplyPlan::Text { .. } => "text",
        }
    }
}

/// Plays a plan into the event channel. Every step returns `None` once the
/// turn is cancelled or the receiver is gone.
struct Player {
    events: mpsc::Sender<StreamEvent>,
    cancellation: CancellationToken,
}

impl Player {
    async fn play(&self, plan: ReplyPlan) -> Option<()> {
        match plan {
            ReplyPlan::Failure { delay, error } => {
                self.pause(delay).await?;
                self.emit(StreamEvent::Error(error)).await
            }
            ReplyPlan::Card {
                card_delay,
                guide,
                settle,
                card,
            } => {
                self.emit(StreamEvent::CardStarted).await?;
                self.pause(card_delay).await?;
                let text = self.type_out(guide).await?;
                self.pause(settle).await?;
                self.emit(StreamEvent::CardReady(card)).await?;
                self.emit(StreamEvent::Completed(text)).await
            }
            ReplyPlan::Text { delay, reply } => {
                self.pause(delay).await?;
                let text = self.type_out(reply).await?;
                self.emit(StreamEvent::Completed(text)).await
            }
        }
    }

    async fn type_out(&self, typing: Typing) -> Option<String> {
        let mut cumulative = String::with_capacity(typing.text.len());
        for (ch, delay) in typing.text.chars().zip(typing.char_delays) {
            self.pause(delay).await?;
            cumulative.push(ch);
            self.emit(StreamEvent::Delta {
                delta: ch.to_string(),
                cumulative: cumulative.clone(),
            })
            .await?;
        }
        Some(cumulative)
    }

    async fn pause(&self, delay: Duration) -> Option<()> {
        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => None,
            _ = tokio::time::sleep(delay) => Some(()),
        }
    }

    async fn emit(&self, event: StreamEvent) -> Option<()> {
        if self.cancellation.is_cancelled() {
            return None;
        }
        self.events.send(event).await.ok()
    }
}
