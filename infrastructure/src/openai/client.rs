//! Completion Request Client for OpenAI-compatible endpoints.
//!
//! Issues `POST {base_url}/chat/completions` with `stream: true` and hands
//! the response body to the Stream Decoder on a background task. The
//! returned [`StreamHandle`] receives the decoded events.

use super::wire::{ChatCompletionRequest, error_message};
use crate::sse::{DEFAULT_MIN_EMIT_INTERVAL, decode_body};
use async_trait::async_trait;
use parley_application::{CompletionError, CompletionGateway, StreamHandle};
use parley_domain::ChatMessage;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Buffered stream events between decoder and consumer
const EVENT_BUFFER: usize = 64;

/// Connection settings for an OpenAI-compatible endpoint
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub connect_timeout: Option<Duration>,
    pub min_emit_interval: Duration,
}

impl OpenAiConfig {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.7,
            max_tokens: 2000,
            connect_timeout: None,
            min_emit_interval: DEFAULT_MIN_EMIT_INTERVAL,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Streaming client for `/chat/completions`
pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiCompatibleClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, CompletionError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| CompletionError::Unknown(format!("Failed to build HTTP client: {e}")))?;
        info!(
            "Completion endpoint: {} (model: {})",
            config.endpoint(),
            config.model
        );
        Ok(Self { http, config })
    }

    async fn request(&self, history: &[ChatMessage]) -> Result<reqwest::Response, CompletionError> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: history,
            stream: true,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        debug!("POST {} ({} messages)", self.config.endpoint(), history.len());

        let response = self
            .http
            .post(self.config.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                CompletionError::Unknown(format!("Failed to reach completion endpoint: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = error_message(status.as_u16(), &body);
            warn!("Completion request failed ({}): {}", status.as_u16(), message);
            return Err(CompletionError::RequestFailed {
                status: status.as_u16(),
                message,
            });
        }
        if response.content_length() == Some(0) {
            return Err(CompletionError::EmptyResponse);
        }
        Ok(response)
    }
}

#[async_trait]
impl CompletionGateway for OpenAiCompatibleClient {
    async fn open_stream(
        &self,
        history: &[ChatMessage],
        cancellation: CancellationToken,
    ) -> Result<StreamHandle, CompletionError> {
        if history.is_empty() {
            return Err(CompletionError::InvalidRequest(
                "message history is empty".to_string(),
            ));
        }

        let response = tokio::select! {
            biased;
            _ = cancellation.cancelled() => return Err(CompletionError::Cancelled),
            response = self.request(history) => response?,
        };

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let token = cancellation.clone();
        let min_interval = self.config.min_emit_interval;
        tokio::spawn(async move {
            match decode_body(response.bytes_stream(), tx, token, min_interval).await {
                Ok(text) => debug!("Completion finished ({} bytes)", text.len()),
                Err(e) if e.is_cancelled() => debug!("Completion cancelled"),
                Err(e) => debug!("Completion failed: {}", e),
            }
        });
        Ok(StreamHandle::new(rx, cancellation))
    }
}
