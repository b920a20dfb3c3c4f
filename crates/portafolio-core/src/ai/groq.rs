use super::sse::SseDecoder;
use crate::state::ChatMessage;
use async_stream::try_stream;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "moonshotai/kimi-k2-instruct-0905";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Ordered text deltas of one streamed completion
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String, UpstreamError>> + Send>>;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("completion API reported an error: {0}")]
    Api(String),
    #[error("malformed completion frame: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("completion stream ended before it was done")]
    Truncated,
}

impl UpstreamError {
    /// True when the failure happened before any streaming started.
    pub fn is_rejection(&self) -> bool {
        matches!(self, UpstreamError::Status { .. } | UpstreamError::Transport(_))
    }
}

/// A message in the completion API's wire format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroqMessage {
    pub role: String,
    pub content: String,
}

impl GroqMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }
}

impl From<&ChatMessage> for GroqMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            content: message.content.clone(),
        }
    }
}

/// Prepend the system prompt to a transcript, leaving the transcript untouched.
pub fn build_messages(system_prompt: &str, transcript: &[ChatMessage]) -> Vec<GroqMessage> {
    std::iter::once(GroqMessage::system(system_prompt))
        .chain(transcript.iter().map(GroqMessage::from))
        .collect()
}

#[derive(Serialize)]
struct GroqRequest<'a> {
    model: &'a str,
    messages: &'a [GroqMessage],
    stream: bool,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct GroqChunk {
    #[serde(default)]
    choices: Vec<GroqChoice>,
    #[serde(default)]
    error: Option<GroqApiError>,
}

#[derive(Deserialize)]
struct GroqChoice {
    #[serde(default)]
    delta: GroqDelta,
}

#[derive(Deserialize, Default)]
struct GroqDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct GroqApiError {
    message: String,
}

/// Sampling settings fixed for every request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Streaming client for Groq's OpenAI-compatible chat completions
#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    base_url: String,
    api_key: String,
    settings: CompletionSettings,
}

impl GroqClient {
    /// Reuse an existing connection pool, e.g. one shared across requests.
    pub fn with_client(client: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            settings: CompletionSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: CompletionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Submit the message list and stream back the text deltas.
    ///
    /// Fails up front when the API rejects the request; failures after that
    /// arrive as an `Err` item and end the stream.
    pub async fn stream_chat(
        &self,
        messages: &[GroqMessage],
    ) -> Result<DeltaStream, UpstreamError> {
        let request = GroqRequest {
            model: &self.settings.model,
            messages,
            stream: true,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body });
        }

        Ok(Box::pin(deltas(response.bytes_stream())))
    }
}

enum Frame {
    Delta(String),
    Done,
}

fn parse_frame(payload: &str) -> Result<Frame, UpstreamError> {
    if payload.trim() == "[DONE]" {
        return Ok(Frame::Done);
    }
    let chunk: GroqChunk = serde_json::from_str(payload)?;
    if let Some(error) = chunk.error {
        return Err(UpstreamError::Api(error.message));
    }
    let text = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .unwrap_or_default();
    Ok(Frame::Delta(text))
}

/// Turn an SSE byte stream into its non-empty text deltas.
pub fn deltas<S>(body: S) -> impl Stream<Item = Result<String, UpstreamError>> + Send
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
{
    try_stream! {
        let mut body = Box::pin(body);
        let mut decoder = SseDecoder::new();
        let mut done = false;

        'read: while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            for payload in decoder.push(&chunk) {
                match parse_frame(&payload)? {
                    Frame::Done => {
                        done = true;
                        break 'read;
                    }
                    Frame::Delta(text) if !text.is_empty() => {
                        yield text;
                    }
                    Frame::Delta(_) => {}
                }
            }
        }

        if !done {
            if let Some(payload) = decoder.finish() {
                match parse_frame(&payload)? {
                    Frame::Done => done = true,
                    Frame::Delta(text) if !text.is_empty() => {
                        yield text;
                    }
                    Frame::Delta(_) => {}
                }
            }
        }

        if !done {
            Err::<(), _>(UpstreamError::Truncated)?;
        }
        debug!("completion stream finished");
    }
}
