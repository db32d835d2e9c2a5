//! Response orchestration use case.
//!
//! Coordinates one conversation turn: optimistic inserts into the
//! [`SessionStore`], a streamed reply from the [`CompletionGateway`], and
//! reconciliation of every stream event into the target message.
//!
//! At most one turn is in flight. Starting a turn cancels the previous
//! one before touching the store, and stream events are only applied while
//! their turn is still the current one, so a superseded stream can never
//! write into messages owned by its successor.

use crate::config::OrchestratorConfig;
use crate::ports::completion_gateway::{CompletionGateway, StreamObserver};
use crate::ports::turn_progress::TurnProgressNotifier;
use crate::store::SessionStore;
use parley_domain::util::preview;
use parley_domain::{
    ArticleCard, ChatMessage, ErrorInfo, MessageKind, MessagePatch, MessageStatus, NewMessage,
    Role, TurnOutcome, TurnState, build_history,
};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Reasons a turn could not be started. None of them change any state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrchestratorError {
    #[error("Message content is empty")]
    EmptyContent,

    #[error("Message not found in the active session: {0}")]
    MessageNotFound(String),

    #[error("No user message precedes message {0}")]
    MissingUserPrompt(String),

    #[error("Message {id} is not in error state ({status:?})")]
    NotRetryable { id: String, status: MessageStatus },
}

struct ActiveTurn {
    id: u64,
    target: String,
    cancellation: CancellationToken,
}

#[derive(Default)]
struct TurnSlot {
    next_id: u64,
    active: Option<ActiveTurn>,
    state: TurnState,
}

impl TurnSlot {
    fn is_current(&self, turn_id: u64) -> bool {
        self.active.as_ref().is_some_and(|t| t.id == turn_id)
    }
}

/// A turn that has passed validation and owns its target message
struct StartedTurn {
    id: u64,
    target: String,
    cancellation: CancellationToken,
    history: Vec<ChatMessage>,
}

/// Drives send / regenerate / retry / stop for the active session.
pub struct ResponseOrchestrator {
    store: SessionStore,
    gateway: Arc<dyn CompletionGateway>,
    config: OrchestratorConfig,
    turn: Mutex<TurnSlot>,
}

impl ResponseOrchestrator {
    pub fn new(store: SessionStore, gateway: Arc<dyn CompletionGateway>) -> Self {
        Self {
            store,
            gateway,
            config: OrchestratorConfig::default(),
            turn: Mutex::new(TurnSlot::default()),
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// State of the most recent turn
    pub fn turn_state(&self) -> TurnState {
        self.slot().state
    }

    /// Target message of the in-flight turn, if any
    pub fn current_target(&self) -> Option<String> {
        self.slot().active.as_ref().map(|t| t.target.clone())
    }

    fn slot(&self) -> MutexGuard<'_, TurnSlot> {
        self.turn.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ==================== Turn entry points ====================

    /// Append a user message and stream a reply into a new placeholder.
    pub async fn send(
        &self,
        content: &str,
        progress: &dyn TurnProgressNotifier,
    ) -> Result<TurnOutcome, OrchestratorError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(OrchestratorError::EmptyContent);
        }
        info!("Sending message: {}", preview(content, 60));

        let turn = self.begin_turn(
            |_| Ok(()),
            |store, ()| {
                store.append_message(NewMessage::user(content));
                let history = build_history(&store.active_messages());
                let placeholder = store.append_message(NewMessage::assistant_placeholder());
                (placeholder.id, history)
            },
        )?;
        Ok(self.run_turn(turn, progress).await)
    }

    /// Discard `message_id` and everything after it, then stream a fresh
    /// reply to the user message that preceded it.
    pub async fn regenerate(
        &self,
        message_id: &str,
        progress: &dyn TurnProgressNotifier,
    ) -> Result<TurnOutcome, OrchestratorError> {
        let turn = self.begin_turn(
            |store| preceding_user_prompt(store, message_id).map(|_| ()),
            |store, ()| {
                store.truncate_from(message_id);
                let history = build_history(&store.active_messages());
                let placeholder = store.append_message(NewMessage::assistant_placeholder());
                (placeholder.id, history)
            },
        )?;
        info!("Regenerating reply (replaces {})", message_id);
        Ok(self.run_turn(turn, progress).await)
    }

    /// Re-run a failed reply in place, keeping its identifier.
    pub async fn retry(
        &self,
        message_id: &str,
        progress: &dyn TurnProgressNotifier,
    ) -> Result<TurnOutcome, OrchestratorError> {
        let turn = self.begin_turn(
            |store| {
                let status = store.read(|c| {
                    c.active_messages()
                        .iter()
                        .find(|m| m.id == message_id)
                        .map(|m| m.status)
                });
                match status {
                    None => Err(OrchestratorError::MessageNotFound(message_id.to_string())),
                    Some(MessageStatus::Error) => preceding_user_prompt(store, message_id),
                    Some(status) => {
                        debug!("Retry ignored: message {} is {:?}", message_id, status);
                        Err(OrchestratorError::NotRetryable {
                            id: message_id.to_string(),
                            status,
                        })
                    }
                }
            },
            |store, index| {
                store.update_message(
                    message_id,
                    MessagePatch::new()
                        .status(MessageStatus::Loading)
                        .clear_error(),
                );
                let history = build_history(&store.active_messages()[..index]);
                (message_id.to_string(), history)
            },
        )?;
        info!("Retrying reply {}", message_id);
        Ok(self.run_turn(turn, progress).await)
    }

    /// Stop the in-flight turn.
    ///
    /// The target keeps whatever text already arrived, gets the stop marker
    /// appended and is marked `sent`. Returns false when nothing was in
    /// flight.
    pub fn stop(&self) -> bool {
        let mut slot = self.slot();
        let Some(turn) = slot.active.take() else {
            return false;
        };
        turn.cancellation.cancel();
        slot.state = TurnState::Cancelled;

        let latest = self.store.read(|c| {
            c.find_message(&turn.target).and_then(|(session, index)| {
                let message = &session.messages[index];
                (index + 1 == session.messages.len() && message.role == Role::Assistant)
                    .then(|| message.content.clone())
            })
        });
        if let Some(content) = latest {
            self.store.update_message(
                &turn.target,
                MessagePatch::new()
                    .content(format!("{}{}", content, self.config.stop_marker))
                    .status(MessageStatus::Sent)
                    .clear_error(),
            );
        }
        info!("Stopped turn {} (message {})", turn.id, turn.target);
        true
    }

    // ==================== Turn machinery ====================

    /// Validate, supersede any in-flight turn, then mutate the store and
    /// register the new turn, all under the turn lock.
    fn begin_turn<V>(
        &self,
        validate: impl FnOnce(&SessionStore) -> Result<V, OrchestratorError>,
        prepare: impl FnOnce(&SessionStore, V) -> (String, Vec<ChatMessage>),
    ) -> Result<StartedTurn, OrchestratorError> {
        let mut slot = self.slot();
        let validated = validate(&self.store).inspect_err(|e| match e {
            OrchestratorError::NotRetryable { .. } => {}
            other => warn!("Turn not started: {}", other),
        })?;

        if let Some(previous) = slot.active.take() {
            previous.cancellation.cancel();
            info!("Superseding turn {} (message {})", previous.id, previous.target);
            self.release_target(&previous.target);
        }

        let (target, history) = prepare(&self.store, validated);
        slot.next_id += 1;
        let turn = StartedTurn {
            id: slot.next_id,
            target,
            cancellation: CancellationToken::new(),
            history,
        };
        slot.active = Some(ActiveTurn {
            id: turn.id,
            target: turn.target.clone(),
            cancellation: turn.cancellation.clone(),
        });
        slot.state = TurnState::AwaitingResponse;
        debug!("Turn {} started for message {}", turn.id, turn.target);
        Ok(turn)
    }

    /// A superseded target that never received content must not stay `loading`.
    fn release_target(&self, message_id: &str) {
        let loading = self.store.read(|c| {
            c.find_message(message_id)
                .is_some_and(|(s, i)| s.messages[i].status == MessageStatus::Loading)
        });
        if loading {
            self.store
                .update_message(message_id, MessagePatch::new().status(MessageStatus::Sent));
        }
    }

    async fn run_turn(&self, turn: StartedTurn, progress: &dyn TurnProgressNotifier) -> TurnOutcome {
        progress.on_turn_start(&turn.target);

        let observer = TurnObserver {
            orchestrator: self,
            turn: &turn,
            progress,
        };
        let result = tokio::select! {
            biased;
            _ = turn.cancellation.cancelled() => return self.cancelled(&turn, progress),
            result = self.gateway.send(&turn.history, &observer, turn.cancellation.clone()) => result,
        };
        match result {
            Ok(text) => self.settle(&turn, Ok(text), progress),
            Err(e) if e.is_cancelled() => self.cancelled(&turn, progress),
            Err(e) => self.settle(&turn, Err(e.to_error_info()), progress),
        }
    }

    /// Patch the target message if the turn is still current. A terminal
    /// patch also releases the turn. Returns false once the turn is gone.
    fn apply(&self, turn: &StartedTurn, patch: MessagePatch, terminal: bool) -> bool {
        let mut slot = self.slot();
        if !slot.is_current(turn.id) || turn.cancellation.is_cancelled() {
            return false;
        }
        self.store.update_message(&turn.target, patch);
        if terminal {
            slot.active = None;
            slot.state = TurnState::Settled;
        }
        true
    }

    fn settle(
        &self,
        turn: &StartedTurn,
        result: Result<String, ErrorInfo>,
        progress: &dyn TurnProgressNotifier,
    ) -> TurnOutcome {
        let patch = match &result {
            Ok(text) => MessagePatch::new()
                .content(text.clone())
                .status(MessageStatus::Sent),
            Err(info) => MessagePatch::new().error(info.clone()),
        };
        if !self.apply(turn, patch, true) {
            return self.cancelled(turn, progress);
        }
        match result {
            Ok(text) => {
                debug!("Turn {} completed ({} bytes)", turn.id, text.len());
                progress.on_turn_complete(&text);
                TurnOutcome::Completed(text)
            }
            Err(info) => {
                warn!("Turn {} failed: {}", turn.id, info);
                progress.on_turn_error(&info);
                TurnOutcome::Failed(info)
            }
        }
    }

    fn cancelled(&self, turn: &StartedTurn, progress: &dyn TurnProgressNotifier) -> TurnOutcome {
        debug!("Turn {} cancelled", turn.id);
        progress.on_turn_cancelled();
        TurnOutcome::Cancelled
    }
}

/// Writes the non-terminal events of one turn into its target message.
/// Events that arrive after the turn was stopped or superseded are dropped.
struct TurnObserver<'a> {
    orchestrator: &'a ResponseOrchestrator,
    turn: &'a StartedTurn,
    progress: &'a dyn TurnProgressNotifier,
}

impl StreamObserver for TurnObserver<'_> {
    fn on_chunk(&self, delta: &str, cumulative: &str) {
        let patch = MessagePatch::new()
            .content(cumulative)
            .status(MessageStatus::Sent);
        if self.orchestrator.apply(self.turn, patch, false) {
            self.progress.on_chunk(delta, cumulative);
        }
    }

    fn on_card_started(&self) {
        let patch = MessagePatch::new().kind(MessageKind::Card);
        self.orchestrator.apply(self.turn, patch, false);
    }

    fn on_card(&self, card: &ArticleCard) {
        let patch = MessagePatch::new().card(card.clone());
        if self.orchestrator.apply(self.turn, patch, false) {
            self.progress.on_card(card);
        }
    }
}

/// Index of the user message immediately preceding `message_id` in the
/// active session.
fn preceding_user_prompt(store: &SessionStore, message_id: &str) -> Result<usize, OrchestratorError> {
    store.read(|c| {
        let messages = c.active_messages();
        let index = messages
            .iter()
            .position(|m| m.id == message_id)
            .ok_or_else(|| OrchestratorError::MessageNotFound(message_id.to_string()))?;
        match index.checked_sub(1).map(|i| &messages[i]) {
            Some(prompt) if prompt.role == Role::User => Ok(index),
            _ => Err(OrchestratorError::MissingUserPrompt(message_id.to_string())),
        }
    })
}
