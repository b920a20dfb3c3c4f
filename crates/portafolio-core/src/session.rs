//! Client side of the chat widget: transcript, streaming buffer and
//! cancellation, independent of how the UI draws them.

use crate::i18n::I18nState;
use crate::state::{ChatMessage, ChatRequest};
use anyhow::{anyhow, Result};
use futures_util::StreamExt;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Signals that the UI consuming a reply has gone away
#[derive(Debug, Clone)]
pub struct CancelToken {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called on any clone.
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives as long as `self`, so this only returns on cancel
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

/// What became of a submitted input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing happened
    Ignored,
    /// The local `clear` command wiped the transcript
    Cleared,
    /// The full reply was appended to the transcript
    Replied(String),
    /// The localized error message was appended instead of a reply
    Failed,
    /// The consumer went away; late output was discarded
    Cancelled,
}

/// Decodes UTF-8 across chunk boundaries without mangling split characters
#[derive(Debug, Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    fn push(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(std::str::from_utf8(&self.pending[..valid]).unwrap_or_default());
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                        // Incomplete sequence at the end: wait for the next chunk
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                    }
                }
            }
        }
    }

    fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

/// One visitor's conversation with the portfolio assistant
pub struct ChatSession {
    client: Client,
    endpoint: String,
    i18n: I18nState,
    transcript: Vec<ChatMessage>,
    streaming: String,
}

impl ChatSession {
    /// `server_url` is the proxy's base URL, e.g. `http://127.0.0.1:3000`.
    pub fn new(server_url: &str, i18n: I18nState) -> Self {
        Self::with_client(Client::new(), server_url, i18n)
    }

    pub fn with_client(client: Client, server_url: &str, i18n: I18nState) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/chat", server_url.trim_end_matches('/')),
            i18n,
            transcript: Vec::new(),
            streaming: String::new(),
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Reply text received so far for the send in progress
    pub fn streaming_content(&self) -> &str {
        &self.streaming
    }

    pub fn i18n(&self) -> &I18nState {
        &self.i18n
    }

    pub fn clear(&mut self) {
        self.transcript.clear();
        self.streaming.clear();
    }

    /// Handle one line of visitor input.
    ///
    /// `on_chunk` sees each decoded piece of the reply as it arrives. Once
    /// `cancel` fires no further chunks are delivered and the partial reply is
    /// dropped.
    pub async fn submit<F>(
        &mut self,
        input: &str,
        cancel: &CancelToken,
        mut on_chunk: F,
    ) -> SubmitOutcome
    where
        F: FnMut(&str),
    {
        let input = input.trim();
        if input.is_empty() {
            return SubmitOutcome::Ignored;
        }
        if is_clear_command(input) {
            self.clear();
            return SubmitOutcome::Cleared;
        }

        self.transcript.push(ChatMessage::user(input));
        self.streaming.clear();

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.stream_reply(&mut on_chunk) => Some(result),
        };

        let reply = std::mem::take(&mut self.streaming);
        match outcome {
            None => {
                debug!("reply cancelled after {} bytes", reply.len());
                SubmitOutcome::Cancelled
            }
            Some(Ok(())) => {
                self.transcript.push(ChatMessage::assistant(reply.clone()));
                SubmitOutcome::Replied(reply)
            }
            Some(Err(e)) => {
                warn!(error = %e, "chat request failed");
                self.transcript.push(ChatMessage::assistant(self.i18n.t("chat.error")));
                SubmitOutcome::Failed
            }
        }
    }

    async fn stream_reply<F>(&mut self, on_chunk: &mut F) -> Result<()>
    where
        F: FnMut(&str),
    {
        let request = ChatRequest {
            messages: self.transcript.clone(),
            locale: Some(self.i18n.locale().as_str().to_string()),
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("chat endpoint returned {}", response.status()));
        }

        let mut body = response.bytes_stream();
        let mut decoder = Utf8Decoder::default();
        while let Some(chunk) = body.next().await {
            let text = decoder.push(&chunk?);
            if !text.is_empty() {
                self.streaming.push_str(&text);
                on_chunk(&text);
            }
        }

        let rest = decoder.finish();
        if !rest.is_empty() {
            self.streaming.push_str(&rest);
            on_chunk(&rest);
        }
        Ok(())
    }
}

/// `clear` wipes the conversation locally and never reaches the server.
pub fn is_clear_command(input: &str) -> bool {
    let command = input.trim();
    let command = command.strip_prefix('/').unwrap_or(command);
    command.eq_ignore_ascii_case("clear")
}
