//! Chat-completions boundary to the text-generation collaborator.
//!
//! Talks to any OpenAI-compatible server. Transport failures are retried
//! with doubling backoff before surfacing; a reply that decodes but says
//! nothing useful is not retried, that is the caller's problem to absorb.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::AppConfig;

const BACKOFF_BASE_MS: u64 = 500;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },
    #[error("could not decode completion response: {0}")]
    Decode(String),
    #[error("empty response from model")]
    EmptyResponse,
}

impl LlmError {
    /// Transport-level failures are worth another attempt; a decoded but
    /// unusable reply is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Network(_) => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::Decode(_) | LlmError::EmptyResponse => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage { role: "user".to_string(), content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage { role: "system".to_string(), content: content.into() }
    }
}

#[derive(Serialize, Debug)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// The seam the classifiers talk through. Production code uses
/// [`LlmClient`]; tests script replies through a fake.
pub trait ChatModel {
    fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;
}

pub struct LlmClient {
    cfg: AppConfig,
    client: reqwest::Client,
}

impl LlmClient {
    pub fn new(cfg: AppConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;
        Ok(LlmClient { cfg, client })
    }

    async fn chat_once(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, LlmError> {
        let request = ChatCompletionRequest {
            model: &self.cfg.model,
            messages,
            max_tokens: self.cfg.max_tokens,
            temperature,
        };
        let url = format!("{}/chat/completions", self.cfg.api_base.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.cfg.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        completion
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .filter(|s| !s.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

impl ChatModel for LlmClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, LlmError> {
        let start = Instant::now();
        debug!(
            "Model call starting - messages={}, prompt_length={} chars",
            messages.len(),
            messages.iter().map(|m| m.content.len()).sum::<usize>()
        );

        let answer = with_retries(self.cfg.max_retries, || {
            self.chat_once(messages, temperature)
        })
        .await?;

        info!(
            "Model call completed - duration={:.2}s, response_length={} chars",
            start.elapsed().as_secs_f32(),
            answer.len()
        );
        Ok(answer)
    }
}

/// Doubling backoff from `BACKOFF_BASE_MS`, retryable errors only.
async fn with_retries<F, Fut>(max_retries: u32, mut call: F) -> Result<String, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, LlmError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match call().await {
            Ok(answer) => return Ok(answer),
            Err(e) if e.is_retryable() && attempt < max_retries => {
                let delay = Duration::from_millis(BACKOFF_BASE_MS << attempt);
                warn!(
                    "Model call failed (attempt {}/{}), retrying in {:?} - {}",
                    attempt + 1,
                    max_retries + 1,
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn retryability_classification() {
        assert!(LlmError::Network("timeout".into()).is_retryable());
        assert!(LlmError::Api { status: 503, body: String::new() }.is_retryable());
        assert!(LlmError::Api { status: 429, body: String::new() }.is_retryable());
        assert!(!LlmError::Api { status: 400, body: String::new() }.is_retryable());
        assert!(!LlmError::Decode("bad json".into()).is_retryable());
        assert!(!LlmError::EmptyResponse.is_retryable());
    }

    #[tokio::test]
    async fn retries_transport_failure_then_succeeds() {
        let calls = Mutex::new(0u32);
        let result = with_retries(2, || {
            let n = {
                let mut guard = calls.lock().unwrap();
                *guard += 1;
                *guard
            };
            async move {
                if n == 1 {
                    Err(LlmError::Network("connection reset".into()))
                } else {
                    Ok("answer".to_string())
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "answer");
        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn does_not_retry_decode_failures() {
        let calls = Mutex::new(0u32);
        let result = with_retries(2, || {
            *calls.lock().unwrap() += 1;
            async { Err(LlmError::Decode("not json".into())) }
        })
        .await;
        assert!(matches!(result, Err(LlmError::Decode(_))));
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn gives_up_after_exhausting_retries() {
        let calls = Mutex::new(0u32);
        let result = with_retries(1, || {
            *calls.lock().unwrap() += 1;
            async { Err(LlmError::Network("unreachable".into())) }
        })
        .await;
        assert!(matches!(result, Err(LlmError::Network(_))));
        assert_eq!(*calls.lock().unwrap(), 2);
    }
}
